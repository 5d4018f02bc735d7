//! Matcher adapter: runs the external Aho-Corasick program on one fixture.

use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

use crate::config::MatcherConfig;

/// What happened to one matcher invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatcherStatus {
    /// The process exited. `code` is `None` when it was terminated by a signal.
    Exited { code: Option<i32> },
    /// The configured timeout elapsed and the process was killed.
    TimedOut,
    /// The process could not be started (missing executable, permissions, ...).
    LaunchFailed { reason: String },
}

impl MatcherStatus {
    pub fn success(&self) -> bool {
        matches!(self, MatcherStatus::Exited { code: Some(0) })
    }
}

/// Runs the matcher with `input` connected to its standard input.
///
/// Implementations return `Err` only for failures on the driver's side (the
/// fixture cannot be opened, the child cannot be waited on). Anything the
/// matcher itself does wrong is reported through [`MatcherStatus`].
pub trait Matcher {
    fn run(&self, input: &Path) -> Result<MatcherStatus>;
}

/// Launches the matcher as a child process that inherits stdout and stderr.
#[derive(Debug, Clone)]
pub struct ProcessMatcher {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ProcessMatcher {
    /// `command[0]` is the program; the rest are passed as separate arguments.
    pub fn new(command: &[String], timeout: Option<Duration>) -> Result<Self> {
        let Some((program, args)) = command.split_first() else {
            bail!("matcher command must be non-empty");
        };
        if program.trim().is_empty() {
            bail!("matcher program must be non-empty");
        }
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout,
        })
    }

    pub fn from_config(cfg: &MatcherConfig) -> Result<Self> {
        Self::new(&cfg.command, cfg.timeout())
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Matcher for ProcessMatcher {
    #[instrument(skip_all, fields(program = %self.program, input = %input.display()))]
    fn run(&self, input: &Path) -> Result<MatcherStatus> {
        let stdin = File::open(input)
            .with_context(|| format!("open {} for matcher stdin", input.display()))?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        debug!("spawning matcher");
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                debug!(err = %err, "matcher spawn failed");
                return Ok(MatcherStatus::LaunchFailed {
                    reason: err.to_string(),
                });
            }
        };

        let status = match self.timeout {
            None => child.wait().context("wait for matcher")?,
            Some(timeout) => match child.wait_timeout(timeout).context("wait for matcher")? {
                Some(status) => status,
                None => {
                    warn!(
                        timeout_secs = timeout.as_secs_f64(),
                        "matcher timed out, killing"
                    );
                    child.kill().context("kill matcher")?;
                    child.wait().context("wait matcher after kill")?;
                    return Ok(MatcherStatus::TimedOut);
                }
            },
        };

        debug!(exit_code = ?status.code(), "matcher finished");
        Ok(MatcherStatus::Exited {
            code: status.code(),
        })
    }
}
