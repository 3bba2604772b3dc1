//! Selection model - boundary points and ranges over the tree

use crate::NodeId;
use serde::{Deserialize, Serialize};

/// A boundary point in the tree.
///
/// For a text container the offset counts characters; for an element it
/// counts children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// The container node
    pub node: NodeId,
    /// Character or child offset within the container
    pub offset: usize,
}

impl Position {
    /// Create a new position
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }

    /// Create a position at the start of a node
    pub fn start_of(node: NodeId) -> Self {
        Self { node, offset: 0 }
    }
}

/// An ordered pair of boundary points.
///
/// `start` is expected to precede or equal `end` in document order; when
/// both are identical the range is collapsed (a caret).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub start: Position,
    pub end: Position,
}

impl SelectionRange {
    /// Create a new range
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a collapsed range (caret only)
    pub fn collapsed(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Range covering `start..end` inside a single container
    pub fn within(node: NodeId, start: usize, end: usize) -> Self {
        Self::new(Position::new(node, start), Position::new(node, end))
    }

    /// Check if this range is collapsed (just a caret)
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn set_start(&mut self, node: NodeId, offset: usize) {
        self.start = Position::new(node, offset);
    }

    pub fn set_end(&mut self, node: NodeId, offset: usize) {
        self.end = Position::new(node, offset);
    }

    /// Collapse onto the start point
    pub fn collapse_to_start(&mut self) {
        self.end = self.start;
    }

    /// Both boundary points, start first
    pub fn endpoints_mut(&mut self) -> [&mut Position; 2] {
        [&mut self.start, &mut self.end]
    }
}
