//! Direction and alignment command vocabulary

use crate::BidiError;
use para_model::{Direction, TextAlign};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A command applied to every block collected from a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirCommand {
    /// Set direction to left-to-right
    Ltr,
    /// Set direction to right-to-left
    Rtl,
    /// Flip the effective direction
    Mirror,
    /// Align lines to the left
    Left,
    /// Align lines to the right
    Right,
    /// Center lines
    Center,
    /// Freeze the inherited direction as an explicit style
    ExplicitDir,
}

impl DirCommand {
    /// All commands in the vocabulary
    pub const ALL: [DirCommand; 7] = [
        DirCommand::Ltr,
        DirCommand::Rtl,
        DirCommand::Mirror,
        DirCommand::Left,
        DirCommand::Right,
        DirCommand::Center,
        DirCommand::ExplicitDir,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DirCommand::Ltr => "ltr",
            DirCommand::Rtl => "rtl",
            DirCommand::Mirror => "mirror",
            DirCommand::Left => "left",
            DirCommand::Right => "right",
            DirCommand::Center => "center",
            DirCommand::ExplicitDir => "explicitdir",
        }
    }

    /// Direction command for a classified paragraph
    pub fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Ltr => DirCommand::Ltr,
            Direction::Rtl => DirCommand::Rtl,
        }
    }

    /// Whether this command changes direction (and re-derives alignment)
    pub fn is_direction(self) -> bool {
        matches!(self, DirCommand::Ltr | DirCommand::Rtl | DirCommand::Mirror)
    }

    /// Target alignment of the alignment commands
    pub fn alignment(self) -> Option<TextAlign> {
        match self {
            DirCommand::Left => Some(TextAlign::Left),
            DirCommand::Right => Some(TextAlign::Right),
            DirCommand::Center => Some(TextAlign::Center),
            _ => None,
        }
    }
}

impl fmt::Display for DirCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirCommand {
    type Err = BidiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        DirCommand::ALL
            .into_iter()
            .find(|c| c.as_str() == lowered)
            .ok_or_else(|| BidiError::UnsupportedCommand(s.to_string()))
    }
}
