//! Feeds every fixture in a directory to an external Aho-Corasick matcher.
//!
//! Prints a header and the fixture text for each file, then runs the matcher
//! with the fixture on stdin and lets it write to the same console.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use fixture_runner::config::{
    DEFAULT_CONFIG_FILE, FixtureOrder, RunnerConfig, load_config, write_config,
};
use fixture_runner::driver::{list_headers, run_all};
use fixture_runner::exit_codes;
use fixture_runner::logging;
use fixture_runner::matcher::ProcessMatcher;

#[derive(Parser)]
#[command(
    name = "fixture-runner",
    version,
    about = "Feed fixture files to an external Aho-Corasick matcher"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// Config file (defaults to `fixture-runner.toml` when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Fixture directory, overriding the config file.
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Fixture order, overriding the config file.
    #[arg(long, value_enum)]
    order: Option<FixtureOrder>,
}

#[derive(Subcommand)]
enum Command {
    /// Print each fixture and run the matcher on it.
    Run {
        #[command(flatten)]
        source: SourceArgs,
        /// Kill a matcher that runs longer than this many seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Matcher program and arguments, overriding the config file.
        #[arg(last = true)]
        matcher: Vec<String>,
    },
    /// Print fixture headers without running the matcher.
    List {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Write a default config file if missing.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::FATAL);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            source,
            timeout_secs,
            matcher,
        } => cmd_run(&source, timeout_secs, matcher),
        Command::List { source } => cmd_list(&source),
        Command::Init { force, config } => cmd_init(config.as_deref(), force),
    }
}

fn cmd_run(source: &SourceArgs, timeout_secs: Option<u64>, matcher: Vec<String>) -> Result<()> {
    let mut cfg = resolve_config(source)?;
    if !matcher.is_empty() {
        cfg.matcher.command = matcher;
    }
    if timeout_secs.is_some() {
        cfg.matcher.timeout_secs = timeout_secs;
    }
    cfg.validate().context("validate matcher options")?;

    let matcher = ProcessMatcher::from_config(&cfg.matcher)?;
    debug!(program = matcher.program(), dir = %cfg.fixtures_dir.display(), "starting run");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_all(&cfg.fixtures_dir, cfg.order, &matcher, &mut out)?;
    Ok(())
}

fn cmd_list(source: &SourceArgs) -> Result<()> {
    let cfg = resolve_config(source)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    list_headers(&cfg.fixtures_dir, cfg.order, &mut out)?;
    Ok(())
}

fn cmd_init(config: Option<&Path>, force: bool) -> Result<()> {
    let path = config.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    if !force && path.exists() {
        println!("init: config exists at {}", path.display());
        return Ok(());
    }
    write_config(path, &RunnerConfig::default())
        .with_context(|| format!("write {}", path.display()))?;
    println!("init: wrote {}", path.display());
    Ok(())
}

/// Load the config file and apply CLI overrides on top of it.
fn resolve_config(source: &SourceArgs) -> Result<RunnerConfig> {
    let path = source
        .config
        .as_deref()
        .unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    let cfg = load_config(path).context("load config")?;
    Ok(apply_overrides(cfg, source))
}

fn apply_overrides(mut cfg: RunnerConfig, source: &SourceArgs) -> RunnerConfig {
    if let Some(dir) = &source.dir {
        cfg.fixtures_dir = dir.clone();
    }
    if let Some(order) = source.order {
        cfg.order = order;
    }
    cfg
}
