//! Console driver for an external Aho-Corasick matcher.
//!
//! Walks a directory of fixture files and, for each one, prints a header and
//! the fixture text before running the matcher with the fixture on its stdin.
//! The matcher writes straight to the inherited console; nothing is compared
//! or asserted here.
//!
//! - **[`fixtures`]**: directory enumeration and fixture paths.
//! - **[`matcher`]**: the [`matcher::Matcher`] seam and the process-backed implementation.
//! - **[`driver`]**: the sequential `run_all` loop tying the two together.
//! - **[`config`]**: TOML configuration with defaults.

pub mod config;
pub mod driver;
pub mod exit_codes;
pub mod fixtures;
pub mod logging;
pub mod matcher;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
