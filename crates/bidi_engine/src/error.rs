//! Error types for direction commands

use para_model::{ModelError, NodeId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BidiError {
    #[error("Command {0} isn't handled")]
    UnsupportedCommand(String),

    #[error("Editable root has no children")]
    EmptyRoot,

    #[error("Selection endpoint {0} is not attached to the tree")]
    DetachedRangeEndpoint(NodeId),

    #[error("Selection offset {offset} is out of bounds for node {node}")]
    InvalidRangeOffset { node: NodeId, offset: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex_lite::Error),

    #[error("Paragraph model error: {0}")]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, BidiError>;
