//! Diagnostic tracing for the driver.
//!
//! Tracing goes to stderr and is filtered by `RUST_LOG`. Stdout is reserved
//! for fixture headers, fixture text and the matcher's own output, so the two
//! never interleave in a captured transcript.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset, which still surfaces
/// matchers that fail to launch or exit non-zero.
///
/// # Example
/// ```bash
/// RUST_LOG=fixture_runner=debug fixture-runner run
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
