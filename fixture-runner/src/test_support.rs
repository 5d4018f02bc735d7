//! Test-only matchers and fixture helpers.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::matcher::{Matcher, MatcherStatus};

/// One recorded matcher invocation: the path it was given and the bytes it would read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub input: PathBuf,
    pub stdin: Vec<u8>,
}

/// Matcher that returns queued statuses in order and records every call.
///
/// Once the queue is empty, every further call reports a clean exit.
pub struct ScriptedMatcher {
    statuses: RefCell<VecDeque<MatcherStatus>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl ScriptedMatcher {
    pub fn new(statuses: Vec<MatcherStatus>) -> Self {
        Self {
            statuses: RefCell::new(statuses.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Matcher that always exits with code 0.
    pub fn passing() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl Matcher for ScriptedMatcher {
    fn run(&self, input: &Path) -> Result<MatcherStatus> {
        let stdin = fs::read(input).with_context(|| format!("read {}", input.display()))?;
        self.calls.borrow_mut().push(RecordedCall {
            input: input.to_path_buf(),
            stdin,
        });
        Ok(self
            .statuses
            .borrow_mut()
            .pop_front()
            .unwrap_or(MatcherStatus::Exited { code: Some(0) }))
    }
}

/// Write `files` (name, contents) into `dir`, creating it if needed.
pub fn write_fixtures(dir: &Path, files: &[(&str, &str)]) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    for (name, contents) in files {
        let path = dir.join(name);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(())
}
