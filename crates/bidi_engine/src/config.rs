//! Engine configuration
//!
//! Configuration is plain serde data. Files are JSON; a file that is missing
//! or fails to parse yields the defaults, with a warning for the latter.

use crate::{BidiError, Result};
use para_model::{Direction, Tag};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Order in which a finished block group is added to the group list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOrder {
    /// Push each group after the ones already collected
    #[default]
    Append,
    /// Put each group in front of the ones already collected
    Prepend,
}

/// What to do with a line break that splits a run into two blocks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineBreakPolicy {
    /// Keep the break as the last child of the block it ends
    #[default]
    Retain,
    /// Drop the break once the blocks exist
    Drop,
}

/// Settings shared by every command run against one tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Tag of synthesized blocks, `DIV` or `P`
    pub block_mode: String,
    /// Text placed into a block that would otherwise render empty
    pub placeholder: String,
    pub group_order: GroupOrder,
    pub line_break_policy: LineBreakPolicy,
    /// Direction of the editable root when nothing sets one
    pub default_direction: Direction,
    /// Skip reclassification when the released key is Enter
    pub skip_enter_reclassify: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            block_mode: "DIV".to_string(),
            placeholder: "\u{a0}".to_string(),
            group_order: GroupOrder::Append,
            line_break_policy: LineBreakPolicy::Retain,
            default_direction: Direction::Ltr,
            skip_enter_reclassify: true,
        }
    }
}

impl EngineConfig {
    /// Tag used for synthesized blocks
    pub fn block_tag(&self) -> Tag {
        match Tag::parse(&self.block_mode) {
            Tag::P => Tag::P,
            _ => Tag::Div,
        }
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        match Tag::parse(&self.block_mode) {
            Tag::Div | Tag::P => {}
            other => {
                return Err(BidiError::Config(format!(
                    "block_mode must be DIV or P, got {other}"
                )))
            }
        }
        if self.placeholder.is_empty() {
            return Err(BidiError::Config("placeholder must not be empty".into()));
        }
        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| BidiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from disk, or return defaults if the file doesn't exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| BidiError::Config(format!("{}: {e}", path.display())))?;
        match Self::from_json(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("Failed to parse engine config, using defaults: {}", e);
                Ok(Self::default())
            }
        }
    }

    /// Save to disk as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BidiError::Config(e.to_string()))?;
        }
        let content =
            serde_json::to_string_pretty(self).map_err(|e| BidiError::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| BidiError::Config(e.to_string()))
    }
}
