//! Host-facing editor facade
//!
//! Owns one tree, its configuration and style query, and a selection
//! holder. Every command runs through a fresh [`EditorContext`] built from
//! these fields, so several editors can live side by side.

use crate::engine::{apply_command, selection_direction};
use crate::markup::prefilter_newlines;
use crate::{
    classify, CascadeStyleQuery, CollectedBlocks, DirCommand, EditorContext, EngineConfig,
    MemorySelection, Result, SelectionAccess, StyleQuery,
};
use para_model::{
    Direction, DocumentTree, ElementData, InlineStyle, MarkupParser, NodeId, Position,
    SelectionRange, Tag,
};

/// Key released in the editing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
    Other,
}

/// A direction-aware paragraph editor over one document tree
pub struct BidiEditor<S: SelectionAccess = MemorySelection> {
    tree: DocumentTree,
    config: EngineConfig,
    styles: Box<dyn StyleQuery>,
    selection: S,
}

impl BidiEditor<MemorySelection> {
    /// Create an editor with an empty `DIV` root and an in-memory selection
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_selection(config, MemorySelection::new())
    }
}

impl<S: SelectionAccess> BidiEditor<S> {
    pub fn with_selection(config: EngineConfig, selection: S) -> Result<Self> {
        config.validate()?;
        let styles = Box::new(CascadeStyleQuery::new(config.default_direction));
        Ok(Self {
            tree: DocumentTree::new(Tag::Div),
            config,
            styles,
            selection,
        })
    }

    /// Replace the style query used for every later command
    pub fn with_style_query(mut self, styles: impl StyleQuery + 'static) -> Self {
        self.styles = Box::new(styles);
        self
    }

    // ========== Accessors ==========

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DocumentTree {
        &mut self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root_id()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn selection(&self) -> &S {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut S {
        &mut self.selection
    }

    // ========== Content ==========

    /// Replace the root's content with one block per line of `value`.
    ///
    /// Each block gets the direction of its own line. Empty lines hold the
    /// configured placeholder. The selection moves to the start of the first
    /// block without notifying the host.
    pub fn load_plain_text(&mut self, value: &str) -> Result<Vec<NodeId>> {
        let root = self.tree.root_id();
        for child in self.tree.children(root).to_vec() {
            self.tree.remove(child, None)?;
        }

        let tag = self.config.block_tag();
        let mut blocks = Vec::new();
        for line in value.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let mut style = InlineStyle::new();
            style.set_direction(classify(line));

            let block = self
                .tree
                .create_element_with(ElementData::new(tag.clone()).with_style(style));
            let content = if line.is_empty() {
                self.config.placeholder.clone()
            } else {
                line.to_string()
            };
            let text = self.tree.create_text(content);
            self.tree.append_child(block, text, None)?;
            self.tree.append_child(root, block, None)?;
            blocks.push(block);
        }

        if let Some(&first) = blocks.first() {
            self.selection
                .set_selection_silently(SelectionRange::collapsed(Position::start_of(first)));
        }
        tracing::debug!(lines = blocks.len(), "loaded plain text");
        Ok(blocks)
    }

    /// Parse `markup` and append the resulting nodes to `parent`
    pub fn insert_markup(&mut self, parent: NodeId, markup: &str) -> Result<Vec<NodeId>> {
        let filtered = prefilter_newlines(markup)?;
        let nodes = MarkupParser::parse(&mut self.tree, &filtered)?;
        for &node in &nodes {
            self.tree.append_child(parent, node, None)?;
        }
        Ok(nodes)
    }

    // ========== Commands ==========

    /// Run `command` against the current selection.
    ///
    /// Without a selection nothing happens. Afterwards the selection is set
    /// silently to the range rebased onto the restructured tree.
    pub fn apply(&mut self, command: DirCommand) -> Result<CollectedBlocks> {
        let Some(range) = self.selection.current_selection() else {
            return Ok(CollectedBlocks::default());
        };
        let mut ctx = EditorContext::new(&mut self.tree, self.styles.as_ref(), &self.config);
        let outcome = apply_command(&mut ctx, &range, command)?;
        self.selection.set_selection_silently(outcome.range);
        Ok(outcome.blocks)
    }

    /// Parse `command` and run it. An unknown command leaves the tree alone.
    pub fn apply_str(&mut self, command: &str) -> Result<CollectedBlocks> {
        let command: DirCommand = command.parse()?;
        self.apply(command)
    }

    /// Reclassify the current paragraph after a key was released.
    ///
    /// Returns `None` when nothing was applied.
    pub fn on_key_up(&mut self, key: Key) -> Result<Option<CollectedBlocks>> {
        let Some(range) = self.selection.current_selection() else {
            return Ok(None);
        };
        if key == Key::Enter && self.config.skip_enter_reclassify {
            return Ok(None);
        }
        let direction = classify(&self.tree.text_content(range.end.node));
        self.apply(DirCommand::for_direction(direction)).map(Some)
    }

    /// Effective direction of the paragraph at the selection start
    pub fn current_direction(&self) -> Result<Option<Direction>> {
        let Some(range) = self.selection.current_selection() else {
            return Ok(None);
        };
        selection_direction(&self.tree, self.styles.as_ref(), &range).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BidiError;

    fn direction_of(editor: &BidiEditor, node: NodeId) -> Option<Direction> {
        editor.tree().element(node).unwrap().style.direction()
    }

    #[test]
    fn test_load_plain_text_classifies_each_line() {
        let mut editor = BidiEditor::new(EngineConfig::default()).unwrap();

        let blocks = editor.load_plain_text("Hello\r\nשלום\n\nWorld").unwrap();

        assert_eq!(blocks.len(), 4);
        assert_eq!(editor.tree().children(editor.root()), blocks.as_slice());
        assert_eq!(direction_of(&editor, blocks[0]), Some(Direction::Ltr));
        assert_eq!(direction_of(&editor, blocks[1]), Some(Direction::Rtl));
        assert_eq!(editor.tree().text_content(blocks[0]), "Hello");
        assert_eq!(editor.tree().text_content(blocks[2]), "\u{a0}");
        assert!(editor.tree().has_tag(blocks[3], &Tag::Div));

        let selection = editor.selection().current_selection().unwrap();
        assert_eq!(selection.start, Position::start_of(blocks[0]));
        assert_eq!(editor.selection().notifications(), 0);
    }

    #[test]
    fn test_load_plain_text_replaces_content() {
        let config = EngineConfig {
            block_mode: "P".to_string(),
            ..EngineConfig::default()
        };
        let mut editor = BidiEditor::new(config).unwrap();
        editor.load_plain_text("one\ntwo").unwrap();

        let blocks = editor.load_plain_text("three").unwrap();

        assert_eq!(editor.tree().children(editor.root()), blocks.as_slice());
        assert!(editor.tree().has_tag(blocks[0], &Tag::P));
        assert_eq!(editor.tree().len(), 3);
    }

    #[test]
    fn test_invalid_block_mode_is_rejected() {
        let config = EngineConfig {
            block_mode: "SPAN".to_string(),
            ..EngineConfig::default()
        };
        assert!(matches!(BidiEditor::new(config), Err(BidiError::Config(_))));
    }

    #[test]
    fn test_apply_without_selection_is_a_no_op() {
        let mut editor = BidiEditor::new(EngineConfig::default()).unwrap();
        editor.load_plain_text("abc").unwrap();
        editor.selection_mut().clear();

        let blocks = editor.apply(DirCommand::Rtl).unwrap();

        assert!(blocks.is_empty());
        assert_eq!(editor.current_direction().unwrap(), None);
    }

    #[test]
    fn test_key_up_reclassifies_paragraph() {
        let mut editor = BidiEditor::new(EngineConfig::default()).unwrap();
        let blocks = editor.load_plain_text("abc").unwrap();
        let text = editor.tree().first_child(blocks[0]).unwrap();
        editor.tree_mut().set_text(text, "שלום", None).unwrap();

        let applied = editor.on_key_up(Key::Char('ש')).unwrap().unwrap();

        assert_eq!(applied.nodes, vec![blocks[0]]);
        assert_eq!(direction_of(&editor, blocks[0]), Some(Direction::Rtl));
        assert_eq!(editor.current_direction().unwrap(), Some(Direction::Rtl));
    }

    #[test]
    fn test_enter_is_skipped_when_configured() {
        let mut editor = BidiEditor::new(EngineConfig::default()).unwrap();
        let blocks = editor.load_plain_text("abc").unwrap();
        let text = editor.tree().first_child(blocks[0]).unwrap();
        editor.tree_mut().set_text(text, "שלום", None).unwrap();

        assert!(editor.on_key_up(Key::Enter).unwrap().is_none());
        assert_eq!(direction_of(&editor, blocks[0]), Some(Direction::Ltr));
    }

    #[test]
    fn test_insert_markup_filters_newlines() {
        let mut editor = BidiEditor::new(EngineConfig::default()).unwrap();
        let root = editor.root();

        let nodes = editor.insert_markup(root, "<p>a\nb</p>").unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(editor.tree().text_content(nodes[0]), "ab");
    }
}
