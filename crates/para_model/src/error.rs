//! Error types for paragraph tree operations

use crate::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0} is not a text node")]
    NotText(NodeId),

    #[error("Node {0} is not attached to the tree")]
    Detached(NodeId),

    #[error("Invalid position: node {node}, offset {offset}")]
    InvalidPosition { node: NodeId, offset: usize },

    #[error("Tree structure error: {0}")]
    TreeStructure(String),

    #[error("Markup parse error: {0}")]
    Markup(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
