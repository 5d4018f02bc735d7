//! The fixture loop.
//!
//! Fixtures are processed strictly one at a time in listing order. For each
//! one the console receives a blank line, the `Test <n>:   <path>` header and
//! the fixture text, and then the matcher runs with the fixture on stdin.
//! Matcher failures are logged and the loop moves on; only driver-side
//! failures (listing, reading, writing) stop the run.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::config::FixtureOrder;
use crate::fixtures::{Fixture, list_fixtures};
use crate::matcher::{Matcher, MatcherStatus};

/// A fixture together with what the matcher did with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureRun {
    pub fixture: Fixture,
    pub status: MatcherStatus,
}

/// Every fixture visited by [`run_all`], in visiting order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub runs: Vec<FixtureRun>,
}

impl RunReport {
    /// Runs whose matcher did not exit cleanly.
    pub fn unsuccessful(&self) -> impl Iterator<Item = &FixtureRun> {
        self.runs.iter().filter(|run| !run.status.success())
    }
}

/// Run the matcher once per fixture in `dir`, writing console text to `out`.
///
/// `out` is flushed before each matcher launch so the header and fixture text
/// always precede whatever the matcher prints to the shared console.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn run_all<M: Matcher, W: Write>(
    dir: &Path,
    order: FixtureOrder,
    matcher: &M,
    out: &mut W,
) -> Result<RunReport> {
    let fixtures = list_fixtures(dir, order)?;
    info!(count = fixtures.len(), "running fixtures");

    let mut report = RunReport::default();
    for fixture in fixtures {
        write_header(out, &fixture).context("write fixture header")?;
        let contents = fs::read(&fixture.path)
            .with_context(|| format!("read fixture {}", fixture.path.display()))?;
        write_contents(out, &contents).context("write fixture contents")?;
        out.flush().context("flush console")?;

        debug!(index = fixture.index, path = %fixture.path.display(), "running matcher");
        let status = matcher
            .run(&fixture.path)
            .with_context(|| format!("run matcher on {}", fixture.path.display()))?;
        log_status(&fixture, &status);
        report.runs.push(FixtureRun { fixture, status });
    }

    info!(
        runs = report.runs.len(),
        unsuccessful = report.unsuccessful().count(),
        "fixtures finished"
    );
    Ok(report)
}

/// Preview the fixtures without running the matcher.
pub fn list_headers<W: Write>(dir: &Path, order: FixtureOrder, out: &mut W) -> Result<usize> {
    let fixtures = list_fixtures(dir, order)?;
    for fixture in &fixtures {
        writeln!(out, "{}", fixture.header()).context("write fixture header")?;
    }
    Ok(fixtures.len())
}

fn write_header<W: Write>(out: &mut W, fixture: &Fixture) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", fixture.header())
}

fn write_contents<W: Write>(out: &mut W, contents: &[u8]) -> std::io::Result<()> {
    out.write_all(contents)?;
    writeln!(out)
}

fn log_status(fixture: &Fixture, status: &MatcherStatus) {
    let path = fixture.path.display();
    match status {
        MatcherStatus::Exited { code: Some(0) } => {
            debug!(index = fixture.index, %path, "matcher exited cleanly");
        }
        MatcherStatus::Exited { code } => {
            warn!(index = fixture.index, %path, exit_code = ?code, "matcher exited unsuccessfully");
        }
        MatcherStatus::TimedOut => {
            warn!(index = fixture.index, %path, "matcher timed out");
        }
        MatcherStatus::LaunchFailed { reason } => {
            warn!(index = fixture.index, %path, %reason, "matcher could not be launched");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedMatcher, write_fixtures};
    use tempfile::tempdir;

    fn expected_block(index: usize, path: &Path, contents: &str) -> String {
        format!("\nTest {index}:   {}\n{contents}\n", path.display())
    }

    #[test]
    fn prints_header_and_contents_per_fixture() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path().join("Tests");
        write_fixtures(&dir, &[("t1.txt", "ababc\n2\nab\nbc\n"), ("t2.txt", "xyz")])
            .expect("fixtures");

        let matcher = ScriptedMatcher::passing();
        let mut out = Vec::new();
        let report = run_all(&dir, FixtureOrder::Name, &matcher, &mut out).expect("run");

        let expected = format!(
            "{}{}",
            expected_block(1, &dir.join("t1.txt"), "ababc\n2\nab\nbc\n"),
            expected_block(2, &dir.join("t2.txt"), "xyz"),
        );
        assert_eq!(String::from_utf8(out).expect("utf8"), expected);
        assert_eq!(report.runs.len(), 2);
        assert_eq!(report.unsuccessful().count(), 0);
    }

    #[test]
    fn matcher_receives_each_fixture_once_in_order() {
        let temp = tempdir().expect("tempdir");
        write_fixtures(temp.path(), &[("b", "second"), ("a", "first"), ("c", "third")])
            .expect("fixtures");

        let matcher = ScriptedMatcher::passing();
        let mut out = Vec::new();
        run_all(temp.path(), FixtureOrder::Name, &matcher, &mut out).expect("run");

        let stdin: Vec<Vec<u8>> = matcher.calls().into_iter().map(|call| call.stdin).collect();
        assert_eq!(
            stdin,
            vec![b"first".to_vec(), b"second".to_vec(), b"third".to_vec()]
        );
    }

    #[test]
    fn listing_order_numbers_every_entry() {
        let temp = tempdir().expect("tempdir");
        write_fixtures(temp.path(), &[("x", "1"), ("y", "2"), ("z", "3")]).expect("fixtures");

        let matcher = ScriptedMatcher::passing();
        let mut out = Vec::new();
        let report = run_all(temp.path(), FixtureOrder::Listing, &matcher, &mut out).expect("run");

        let indices: Vec<usize> = report.runs.iter().map(|run| run.fixture.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        let called: Vec<_> = matcher.calls().into_iter().map(|call| call.input).collect();
        let visited: Vec<_> = report.runs.iter().map(|run| run.fixture.path.clone()).collect();
        assert_eq!(called, visited);
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text.matches("Test ").count(), 3);
    }

    #[test]
    fn empty_dir_prints_nothing() {
        let temp = tempdir().expect("tempdir");
        let matcher = ScriptedMatcher::passing();
        let mut out = Vec::new();
        let report = run_all(temp.path(), FixtureOrder::Listing, &matcher, &mut out).expect("run");

        assert!(report.runs.is_empty());
        assert!(out.is_empty());
        assert!(matcher.calls().is_empty());
    }

    #[test]
    fn missing_dir_fails_before_any_header() {
        let temp = tempdir().expect("tempdir");
        let matcher = ScriptedMatcher::passing();
        let mut out = Vec::new();
        let err = run_all(
            &temp.path().join("missing"),
            FixtureOrder::Listing,
            &matcher,
            &mut out,
        )
        .expect_err("missing dir");

        assert!(format!("{err:#}").contains("missing"));
        assert!(out.is_empty());
    }

    #[test]
    fn matcher_failures_do_not_stop_the_run() {
        let temp = tempdir().expect("tempdir");
        write_fixtures(temp.path(), &[("t1", "a"), ("t2", "b"), ("t3", "c")]).expect("fixtures");

        let matcher = ScriptedMatcher::new(vec![
            MatcherStatus::LaunchFailed {
                reason: "not found".to_string(),
            },
            MatcherStatus::Exited { code: Some(3) },
        ]);
        let mut out = Vec::new();
        let report = run_all(temp.path(), FixtureOrder::Name, &matcher, &mut out).expect("run");

        assert_eq!(report.runs.len(), 3);
        assert_eq!(matcher.calls().len(), 3);
        let unsuccessful: Vec<usize> = report
            .unsuccessful()
            .map(|run| run.fixture.index)
            .collect();
        assert_eq!(unsuccessful, vec![1, 2]);
        assert!(report.runs[2].status.success());
    }

    #[test]
    fn unreadable_fixture_aborts_after_its_header() {
        let temp = tempdir().expect("tempdir");
        write_fixtures(temp.path(), &[("a.txt", "ok")]).expect("fixtures");
        fs::create_dir(temp.path().join("b.dir")).expect("subdir");
        write_fixtures(temp.path(), &[("c.txt", "never")]).expect("fixtures");

        let matcher = ScriptedMatcher::passing();
        let mut out = Vec::new();
        let err = run_all(temp.path(), FixtureOrder::Name, &matcher, &mut out)
            .expect_err("directory entry is not readable as a fixture");

        assert!(format!("{err:#}").contains("read fixture"));
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Test 1:   "));
        assert!(text.contains("Test 2:   "));
        assert!(!text.contains("Test 3:   "));
        assert_eq!(matcher.calls().len(), 1);
    }

    #[test]
    fn list_headers_does_not_run_matcher() {
        let temp = tempdir().expect("tempdir");
        write_fixtures(temp.path(), &[("t1.txt", "a"), ("t2.txt", "b")]).expect("fixtures");

        let mut out = Vec::new();
        let count = list_headers(temp.path(), FixtureOrder::Name, &mut out).expect("list");

        assert_eq!(count, 2);
        let expected = format!(
            "Test 1:   {}\nTest 2:   {}\n",
            temp.path().join("t1.txt").display(),
            temp.path().join("t2.txt").display()
        );
        assert_eq!(String::from_utf8(out).expect("utf8"), expected);
    }
}
