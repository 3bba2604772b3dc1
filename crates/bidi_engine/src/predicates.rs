//! Tree predicates
//!
//! Block classification goes through the [`StyleQuery`]; the tag sets below
//! cover structural tags whose role the engine fixes by name.

use crate::StyleQuery;
use para_model::{DocumentTree, NodeId, Tag};

/// Blocks that carry a line of text and take direction themselves
pub const LINE_TEXT_TAGS: &[Tag] = &[
    Tag::Div,
    Tag::P,
    Tag::Li,
    Tag::H1,
    Tag::H2,
    Tag::H3,
    Tag::H4,
    Tag::H5,
    Tag::H6,
    Tag::Address,
    Tag::Pre,
    Tag::Dt,
    Tag::Dd,
    Tag::Td,
    Tag::Center,
];

/// Table structure walked through rather than treated as a unit
pub const TABLE_CONTAINERS: &[Tag] = &[Tag::Table, Tag::Thead, Tag::Tbody, Tag::Tr];

/// Containers that end an inline run without being a line themselves
pub const BLOCK_CONTAINERS: &[Tag] = &[Tag::Table, Tag::Ol, Tag::Ul, Tag::Blockquote];

/// Cells whose contents form a separate block group
pub const CELL_TAGS: &[Tag] = &[Tag::Td, Tag::Th, Tag::Caption];

/// Whether a node lays out as a block. The editable root always does.
pub fn is_block(tree: &DocumentTree, styles: &dyn StyleQuery, node: NodeId) -> bool {
    if node == tree.root_id() {
        return true;
    }
    tree.is_element(node) && styles.effective_style(tree, node).display.is_block_level()
}

/// Text, comments and non-block elements
pub fn is_inline_or_text(tree: &DocumentTree, styles: &dyn StyleQuery, node: NodeId) -> bool {
    tree.contains(node) && !is_block(tree, styles, node)
}

pub fn has_tag(tree: &DocumentTree, node: NodeId, tag: &Tag) -> bool {
    tree.has_tag(node, tag)
}

pub fn has_tag_from(tree: &DocumentTree, node: NodeId, tags: &[Tag]) -> bool {
    tree.tag(node).is_some_and(|t| tags.contains(t))
}

/// A line-text block other than the editable root
pub fn is_block_with_text(tree: &DocumentTree, node: NodeId) -> bool {
    node != tree.root_id() && has_tag_from(tree, node, LINE_TEXT_TAGS)
}

/// Nearest ancestor-or-self with `tag`, stopping below the editable root
pub fn block_ancestor(tree: &DocumentTree, node: NodeId, tag: &Tag) -> Option<NodeId> {
    let root = tree.root_id();
    std::iter::once(node)
        .chain(tree.ancestors(node))
        .take_while(|&n| n != root)
        .find(|&n| tree.has_tag(n, tag))
}

/// Nearest table cell or caption around `node`, `None` outside tables
pub fn cell_container(tree: &DocumentTree, node: NodeId) -> Option<NodeId> {
    let root = tree.root_id();
    std::iter::once(node)
        .chain(tree.ancestors(node))
        .take_while(|&n| n != root)
        .find(|&n| has_tag_from(tree, n, CELL_TAGS))
}
