//! Per-command execution context

use crate::predicates::{self, BLOCK_CONTAINERS, TABLE_CONTAINERS};
use crate::{EngineConfig, StyleQuery};
use para_model::{ComputedStyle, DocumentTree, NodeId, Tag};

/// Everything one command needs: the tree it restructures, the style
/// collaborator it classifies with, and the engine settings.
pub struct EditorContext<'a> {
    pub tree: &'a mut DocumentTree,
    pub styles: &'a dyn StyleQuery,
    pub config: &'a EngineConfig,
}

impl<'a> EditorContext<'a> {
    pub fn new(
        tree: &'a mut DocumentTree,
        styles: &'a dyn StyleQuery,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            tree,
            styles,
            config,
        }
    }

    pub fn root(&self) -> NodeId {
        self.tree.root_id()
    }

    pub fn effective_style(&self, node: NodeId) -> ComputedStyle {
        self.styles.effective_style(self.tree, node)
    }

    pub fn is_block(&self, node: NodeId) -> bool {
        predicates::is_block(self.tree, self.styles, node)
    }

    pub fn is_inline_or_text(&self, node: NodeId) -> bool {
        predicates::is_inline_or_text(self.tree, self.styles, node)
    }

    pub fn is_block_with_text(&self, node: NodeId) -> bool {
        predicates::is_block_with_text(self.tree, node)
    }

    pub fn has_tag(&self, node: NodeId, tag: &Tag) -> bool {
        predicates::has_tag(self.tree, node, tag)
    }

    pub fn has_tag_from(&self, node: NodeId, tags: &[Tag]) -> bool {
        predicates::has_tag_from(self.tree, node, tags)
    }

    pub fn is_table_container(&self, node: NodeId) -> bool {
        self.has_tag_from(node, TABLE_CONTAINERS)
    }

    /// A sibling that ends an inline run: any block or block container
    pub fn ends_run(&self, node: NodeId) -> bool {
        self.is_block(node) || self.has_tag_from(node, BLOCK_CONTAINERS)
    }
}
