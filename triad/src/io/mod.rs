//! I/O helpers: configuration, display, human input and game summaries.

pub mod config;
pub mod display;
pub mod input;
pub mod summary;
