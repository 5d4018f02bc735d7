//! Stable exit codes for fixture-runner CLI commands.

/// Command finished. Matcher exit statuses do not affect this.
pub const OK: i32 = 0;
/// Fatal error: missing fixture directory, unreadable fixture, invalid config, or I/O failure.
pub const FATAL: i32 = 1;
