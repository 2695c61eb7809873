//! Log setup for the `herdcheck` binary.
//!
//! The validator's real output is the report: posted as a PR comment, or
//! printed to stdout by `--dry-run` and `check`. Logs therefore always go to
//! stderr, so CI steps can capture the report with a plain redirect.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `level` (the CLI's `--verbose` switch). `json`
/// selects newline-delimited JSON, which CI log collectors index by the
/// `event` field the [`obs`](crate::obs) hooks attach. A second call is a
/// no-op.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let output = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let output = if json {
        output.json().boxed()
    } else {
        output.boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(output)
        .try_init()
        .ok();
}
