//! Node kinds and the element vocabulary

use crate::style::{Attributes, InlineStyle};
use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Element names the engine distinguishes.
///
/// Anything outside the known set is kept as [`Tag::Other`] with its
/// upper-cased name, so unknown markup survives a round trip through the
/// tree without being classified as one of the structural tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Body,
    Div,
    P,
    Li,
    Ol,
    Ul,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Address,
    Pre,
    Dt,
    Dd,
    Td,
    Th,
    Table,
    Thead,
    Tbody,
    Tfoot,
    Tr,
    Caption,
    Blockquote,
    Center,
    Br,
    Span,
    B,
    I,
    U,
    Em,
    Strong,
    A,
    Font,
    Other(String),
}

impl Tag {
    /// Parse a tag name, ignoring case
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "BODY" => Tag::Body,
            "DIV" => Tag::Div,
            "P" => Tag::P,
            "LI" => Tag::Li,
            "OL" => Tag::Ol,
            "UL" => Tag::Ul,
            "H1" => Tag::H1,
            "H2" => Tag::H2,
            "H3" => Tag::H3,
            "H4" => Tag::H4,
            "H5" => Tag::H5,
            "H6" => Tag::H6,
            "ADDRESS" => Tag::Address,
            "PRE" => Tag::Pre,
            "DT" => Tag::Dt,
            "DD" => Tag::Dd,
            "TD" => Tag::Td,
            "TH" => Tag::Th,
            "TABLE" => Tag::Table,
            "THEAD" => Tag::Thead,
            "TBODY" => Tag::Tbody,
            "TFOOT" => Tag::Tfoot,
            "TR" => Tag::Tr,
            "CAPTION" => Tag::Caption,
            "BLOCKQUOTE" => Tag::Blockquote,
            "CENTER" => Tag::Center,
            "BR" => Tag::Br,
            "SPAN" => Tag::Span,
            "B" => Tag::B,
            "I" => Tag::I,
            "U" => Tag::U,
            "EM" => Tag::Em,
            "STRONG" => Tag::Strong,
            "A" => Tag::A,
            "FONT" => Tag::Font,
            other => Tag::Other(other.to_string()),
        }
    }

    /// Upper-case element name
    pub fn name(&self) -> &str {
        match self {
            Tag::Body => "BODY",
            Tag::Div => "DIV",
            Tag::P => "P",
            Tag::Li => "LI",
            Tag::Ol => "OL",
            Tag::Ul => "UL",
            Tag::H1 => "H1",
            Tag::H2 => "H2",
            Tag::H3 => "H3",
            Tag::H4 => "H4",
            Tag::H5 => "H5",
            Tag::H6 => "H6",
            Tag::Address => "ADDRESS",
            Tag::Pre => "PRE",
            Tag::Dt => "DT",
            Tag::Dd => "DD",
            Tag::Td => "TD",
            Tag::Th => "TH",
            Tag::Table => "TABLE",
            Tag::Thead => "THEAD",
            Tag::Tbody => "TBODY",
            Tag::Tfoot => "TFOOT",
            Tag::Tr => "TR",
            Tag::Caption => "CAPTION",
            Tag::Blockquote => "BLOCKQUOTE",
            Tag::Center => "CENTER",
            Tag::Br => "BR",
            Tag::Span => "SPAN",
            Tag::B => "B",
            Tag::I => "I",
            Tag::U => "U",
            Tag::Em => "EM",
            Tag::Strong => "STRONG",
            Tag::A => "A",
            Tag::Font => "FONT",
            Tag::Other(name) => name,
        }
    }

    /// Void elements never have children
    pub fn is_void(&self) -> bool {
        matches!(self, Tag::Br) || matches!(self, Tag::Other(name) if name == "IMG" || name == "HR" || name == "WBR")
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Discriminant of a node's kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    Text,
    Element,
    Comment,
}

/// Element payload: tag, presentational attributes and inline style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementData {
    pub tag: Tag,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub style: InlineStyle,
}

impl ElementData {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: Attributes::default(),
            style: InlineStyle::default(),
        }
    }

    /// Builder-style inline style setter
    pub fn with_style(mut self, style: InlineStyle) -> Self {
        self.style = style;
        self
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.set(name, value);
        self
    }
}

/// What a node holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Leaf owning a mutable character sequence
    Text(String),
    /// Element with ordered children
    Element(ElementData),
    /// Inert leaf, skipped and removed by restructuring
    Comment(String),
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Comment(_) => NodeType::Comment,
        }
    }
}

/// A node stored in the tree
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub kind: NodeKind,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    /// Get the unique ID of this node
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the type of this node
    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Get the IDs of child nodes
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }

    /// Get the ID of the parent node (None for the root and detached nodes)
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    /// Only non-void elements take children
    pub fn can_have_children(&self) -> bool {
        match &self.kind {
            NodeKind::Element(data) => !data.tag.is_void(),
            _ => false,
        }
    }

    /// Element payload, if any
    pub fn element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Text of a text node
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Element tag, if this is an element
    pub fn tag(&self) -> Option<&Tag> {
        self.element().map(|data| &data.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_parse_is_case_insensitive() {
        assert_eq!(Tag::parse("div"), Tag::Div);
        assert_eq!(Tag::parse("Blockquote"), Tag::Blockquote);
        assert_eq!(Tag::parse("br"), Tag::Br);
        assert_eq!(Tag::parse("section"), Tag::Other("SECTION".to_string()));
    }

    #[test]
    fn test_tag_name_round_trip() {
        for tag in [Tag::Div, Tag::Td, Tag::H4, Tag::Center, Tag::Other("NAV".into())] {
            assert_eq!(Tag::parse(tag.name()), tag);
        }
    }

    #[test]
    fn test_void_elements() {
        assert!(Tag::Br.is_void());
        assert!(Tag::parse("img").is_void());
        assert!(!Tag::Div.is_void());
    }
}
