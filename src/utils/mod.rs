//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Captured command output handling
//! - `shell` - Shell-style quoting for display

pub mod command;
pub mod shell;
