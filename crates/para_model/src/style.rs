//! Inline style, presentational attributes and resolved style snapshots

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Direction and alignment values
// =============================================================================

/// Base writing direction of a block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    /// The other direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Ltr => Direction::Rtl,
            Direction::Rtl => Direction::Ltr,
        }
    }

    /// CSS keyword
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ltr" => Ok(Direction::Ltr),
            "rtl" => Ok(Direction::Rtl),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// Horizontal alignment of a block's lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Start,
    End,
    Left,
    Right,
    Center,
    Justify,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Start => "start",
            TextAlign::End => "end",
            TextAlign::Left => "left",
            TextAlign::Right => "right",
            TextAlign::Center => "center",
            TextAlign::Justify => "justify",
        }
    }

    pub fn is_center(self) -> bool {
        self == TextAlign::Center
    }
}

impl fmt::Display for TextAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextAlign {
    type Err = String;

    /// Vendor centering keywords collapse to [`TextAlign::Center`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(TextAlign::Start),
            "end" => Ok(TextAlign::End),
            "left" => Ok(TextAlign::Left),
            "right" => Ok(TextAlign::Right),
            "center" | "middle" | "-moz-center" | "-webkit-center" => Ok(TextAlign::Center),
            "justify" => Ok(TextAlign::Justify),
            other => Err(format!("unknown text-align: {other}")),
        }
    }
}

/// Layout role of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Display {
    Block,
    ListItem,
    Table,
    TableRowGroup,
    TableRow,
    TableCell,
    Inline,
    None,
}

impl Display {
    /// Whether this role starts its own line group
    pub fn is_block_level(self) -> bool {
        !matches!(self, Display::Inline | Display::None)
    }

    /// Parse a CSS `display` keyword; unknown values are inline
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "block" | "flex" | "grid" | "flow-root" => Display::Block,
            "list-item" => Display::ListItem,
            "table" => Display::Table,
            "table-row-group" | "table-header-group" | "table-footer-group" => {
                Display::TableRowGroup
            }
            "table-row" => Display::TableRow,
            "table-cell" | "table-caption" => Display::TableCell,
            "none" => Display::None,
            _ => Display::Inline,
        }
    }
}

// =============================================================================
// Inline style declarations
// =============================================================================

/// Ordered `property: value` declarations of an element's `style`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse style text such as `direction: rtl; text-align: center`
    pub fn from_css_text(text: &str) -> Self {
        let mut style = Self::new();
        for declaration in text.split(';') {
            if let Some((property, value)) = declaration.split_once(':') {
                style.set(property, value.trim());
            }
        }
        style
    }

    /// Serialize back to style text
    pub fn css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(property, value)| format!("{property}: {value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        let property = property.trim().to_ascii_lowercase();
        self.declarations
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set a declaration in place; an empty value removes it
    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        let property = property.trim().to_ascii_lowercase();
        let value = value.into();
        if property.is_empty() {
            return;
        }
        if value.trim().is_empty() {
            self.remove(&property);
            return;
        }
        match self.declarations.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value,
            None => self.declarations.push((property, value)),
        }
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        let property = property.trim().to_ascii_lowercase();
        let index = self.declarations.iter().position(|(p, _)| *p == property)?;
        Some(self.declarations.remove(index).1)
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.get("direction").and_then(|v| v.parse().ok())
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.set("direction", direction.as_str());
    }

    pub fn text_align(&self) -> Option<TextAlign> {
        self.get("text-align").and_then(|v| v.parse().ok())
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.set("text-align", align.as_str());
    }

    pub fn clear_text_align(&mut self) {
        self.remove("text-align");
    }

    pub fn display(&self) -> Option<Display> {
        self.get("display").map(Display::parse)
    }
}

// =============================================================================
// Presentational attributes
// =============================================================================

/// Ordered element attributes; names are stored lower-cased.
///
/// `style` never lives here, it is parsed into [`InlineStyle`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        let index = self.entries.iter().position(|(n, _)| *n == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Resolved style snapshot
// =============================================================================

/// Resolved, inherited style of one node at query time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedStyle {
    pub display: Display,
    pub direction: Direction,
    pub text_align: TextAlign,
    /// Left margin in pixels (0 when unparseable)
    pub margin_left: f32,
    /// Right margin in pixels (0 when unparseable)
    pub margin_right: f32,
    pub font: Option<String>,
    pub line_height: Option<String>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Inline,
            direction: Direction::Ltr,
            text_align: TextAlign::Start,
            margin_left: 0.0,
            margin_right: 0.0,
            font: None,
            line_height: None,
        }
    }
}

/// Parse a leading integer pixel length the lenient way (`"12px"` -> 12)
pub fn parse_pixels(value: &str) -> f32 {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    value[..end].parse::<i32>().map(|v| v as f32).unwrap_or(0.0)
}
