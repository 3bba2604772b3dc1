//! Paragraph Model - Mutable node tree with tracked selection ranges
//!
//! This crate provides the tree the direction engine restructures: text,
//! element and comment nodes with stable ids, inline style and attributes,
//! boundary-point ranges, and structural edits that keep a caller's range
//! valid while nodes are split, moved, merged and removed.

mod node;
mod node_id;
mod tree;
mod selection;
mod error;
pub mod style;
mod fragment;

pub use node::*;
pub use node_id::*;
pub use tree::*;
pub use selection::*;
pub use error::*;
pub use style::*;
pub use fragment::*;
