//! BiDi Engine - Paragraph block materialization and direction commands
//!
//! This crate turns a selection over a mixed inline/block tree into the set
//! of paragraph blocks it touches, creating blocks for loose inline runs
//! where needed, and applies direction (`ltr`, `rtl`, `mirror`,
//! `explicitdir`) or alignment (`left`, `right`, `center`) commands to them.
//! The caller's selection is rebased through every structural edit.

mod error;
mod classifier;
mod command;
mod config;
mod style_query;
mod context;
mod host;
mod editor;
pub mod predicates;
pub mod markup;
pub mod materializer;
pub mod normalizer;
pub mod collector;
pub mod applier;
pub mod engine;

pub use error::*;
pub use classifier::*;
pub use command::*;
pub use config::*;
pub use style_query::*;
pub use context::*;
pub use host::*;
pub use editor::*;
pub use collector::CollectedBlocks;
pub use engine::{apply_command, apply_command_str, selection_direction, CommandOutcome};
