//! Fixture discovery.
//!
//! Every entry of the fixture directory is a fixture. Nothing is filtered by
//! extension or file type; an entry that turns out to be unreadable fails the
//! run when the driver reaches it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::FixtureOrder;

/// A single fixture file and its 1-based position in the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub index: usize,
    /// Fixture directory joined with the entry's file name.
    pub path: PathBuf,
}

impl Fixture {
    /// Header line printed before the fixture text, without a trailing newline.
    pub fn header(&self) -> String {
        format!("Test {}:   {}", self.index, self.path.display())
    }
}

/// List fixtures in `dir`.
///
/// Errors if the directory is missing or cannot be listed. Indices are
/// assigned after ordering, so they always run `1..=n`.
pub fn list_fixtures(dir: &Path, order: FixtureOrder) -> Result<Vec<Fixture>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read fixtures dir {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read entry in {}", dir.display()))?;
        names.push(entry.file_name());
    }
    if order == FixtureOrder::Name {
        names.sort();
    }
    debug!(dir = %dir.display(), count = names.len(), ?order, "fixtures listed");

    Ok(names
        .into_iter()
        .enumerate()
        .map(|(offset, name)| Fixture {
            index: offset + 1,
            path: dir.join(name),
        })
        .collect())
}
