//! Driver configuration stored in `fixture-runner.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "fixture-runner.toml";

/// Fixture directory used when neither the config file nor the CLI names one.
pub const DEFAULT_FIXTURES_DIR: &str = "Tests/Tests Aho-Corasick";

/// Matcher executable used when no command is configured.
pub const DEFAULT_MATCHER: &str = "AhoCorasick";

/// Order in which fixtures are visited.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum FixtureOrder {
    /// Whatever order the directory listing returns.
    #[default]
    Listing,
    /// Sorted by file name.
    Name,
}

/// Driver configuration (TOML).
///
/// Missing fields fall back to defaults, so an empty file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunnerConfig {
    /// Directory whose entries are fed to the matcher one by one.
    pub fixtures_dir: PathBuf,

    pub order: FixtureOrder,

    pub matcher: MatcherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MatcherConfig {
    /// Program and arguments, e.g. `["./AhoCorasick"]` or `["python3", "ac.py"]`.
    pub command: Vec<String>,

    /// Kill the matcher after this many seconds. Unset means wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            command: vec![DEFAULT_MATCHER.to_string()],
            timeout_secs: None,
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            fixtures_dir: PathBuf::from(DEFAULT_FIXTURES_DIR),
            order: FixtureOrder::default(),
            matcher: MatcherConfig::default(),
        }
    }
}

impl RunnerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fixtures_dir.as_os_str().is_empty() {
            return Err(anyhow!("fixtures_dir must be non-empty"));
        }
        if self.matcher.command.is_empty() || self.matcher.command[0].trim().is_empty() {
            return Err(anyhow!("matcher.command must be a non-empty array"));
        }
        if self.matcher.timeout_secs == Some(0) {
            return Err(anyhow!("matcher.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

impl MatcherConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `RunnerConfig::default()`.
pub fn load_config(path: &Path) -> Result<RunnerConfig> {
    if !path.exists() {
        let cfg = RunnerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RunnerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &RunnerConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp_path = path.with_extension("toml.tmp");
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
