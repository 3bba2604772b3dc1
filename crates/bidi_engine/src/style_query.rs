//! Effective style resolution
//!
//! The engine never reads layout state directly. It asks a [`StyleQuery`]
//! for a resolved snapshot of a node, which lets a host plug in real
//! computed style while tests and headless use fall back to
//! [`CascadeStyleQuery`].

use para_model::{
    parse_pixels, ComputedStyle, Direction, Display, DocumentTree, NodeId, Tag, TextAlign,
};

/// Source of resolved style for tree nodes
pub trait StyleQuery {
    /// Resolved, inherited style of `node` as it currently stands in `tree`
    fn effective_style(&self, tree: &DocumentTree, node: NodeId) -> ComputedStyle;
}

/// Element names outside the closed vocabulary that lay out as blocks
const OTHER_BLOCK_NAMES: &[&str] = &[
    "ARTICLE", "ASIDE", "DL", "FIELDSET", "FIGURE", "FOOTER", "FORM", "HEADER", "HR", "MAIN",
    "NAV", "SECTION",
];

/// Default layout role of a tag
pub fn tag_display(tag: &Tag) -> Display {
    match tag {
        Tag::Li => Display::ListItem,
        Tag::Table => Display::Table,
        Tag::Thead | Tag::Tbody | Tag::Tfoot => Display::TableRowGroup,
        Tag::Tr => Display::TableRow,
        Tag::Td | Tag::Th | Tag::Caption => Display::TableCell,
        Tag::Body
        | Tag::Div
        | Tag::P
        | Tag::H1
        | Tag::H2
        | Tag::H3
        | Tag::H4
        | Tag::H5
        | Tag::H6
        | Tag::Address
        | Tag::Pre
        | Tag::Dt
        | Tag::Dd
        | Tag::Blockquote
        | Tag::Center
        | Tag::Ol
        | Tag::Ul => Display::Block,
        Tag::Other(name) if OTHER_BLOCK_NAMES.contains(&name.as_str()) => Display::Block,
        _ => Display::Inline,
    }
}

/// Resolves style from inline declarations, presentational attributes and
/// tag defaults, inheriting `direction`, `text-align`, font and line height
/// along the ancestor chain.
///
/// On a single element a `dir` attribute outranks the `direction`
/// declaration and an `align` attribute outranks `text-align`. A `CENTER`
/// element centers its content.
#[derive(Debug, Clone, Default)]
pub struct CascadeStyleQuery {
    default_direction: Direction,
}

impl CascadeStyleQuery {
    pub fn new(default_direction: Direction) -> Self {
        Self { default_direction }
    }

    fn display(tree: &DocumentTree, node: NodeId) -> Display {
        match tree.element(node) {
            Some(data) => data.style.display().unwrap_or_else(|| tag_display(&data.tag)),
            None => Display::Inline,
        }
    }

    fn direction(&self, tree: &DocumentTree, node: NodeId) -> Direction {
        Self::chain(tree, node)
            .find_map(|id| {
                let data = tree.element(id)?;
                data.attributes
                    .get("dir")
                    .and_then(|v| v.parse().ok())
                    .or_else(|| data.style.direction())
            })
            .unwrap_or(self.default_direction)
    }

    fn text_align(tree: &DocumentTree, node: NodeId) -> TextAlign {
        Self::chain(tree, node)
            .find_map(|id| {
                let data = tree.element(id)?;
                data.attributes
                    .get("align")
                    .and_then(|v| v.parse().ok())
                    .or_else(|| data.style.text_align())
                    .or_else(|| (data.tag == Tag::Center).then_some(TextAlign::Center))
            })
            .unwrap_or_default()
    }

    fn inherited(tree: &DocumentTree, node: NodeId, properties: &[&str]) -> Option<String> {
        Self::chain(tree, node).find_map(|id| {
            let data = tree.element(id)?;
            properties
                .iter()
                .find_map(|p| data.style.get(p))
                .map(str::to_string)
        })
    }

    /// `node` followed by its ancestors
    fn chain(tree: &DocumentTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::once(node).chain(tree.ancestors(node))
    }
}

impl StyleQuery for CascadeStyleQuery {
    fn effective_style(&self, tree: &DocumentTree, node: NodeId) -> ComputedStyle {
        let own = tree.element(node).map(|data| &data.style);
        let margin = |property: &str| {
            own.and_then(|style| style.get(property))
                .map(parse_pixels)
                .unwrap_or(0.0)
        };

        ComputedStyle {
            display: Self::display(tree, node),
            direction: self.direction(tree, node),
            text_align: Self::text_align(tree, node),
            margin_left: margin("margin-left"),
            margin_right: margin("margin-right"),
            font: Self::inherited(tree, node, &["font", "font-family"]),
            line_height: Self::inherited(tree, node, &["line-height"]),
        }
    }
}
