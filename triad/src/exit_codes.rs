//! Stable exit codes for triad CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid config, I/O errors or a failed game thread.
pub const INVALID: i32 = 1;
