//! Tracing subscriber initialization.
//!
//! Two flavors: JSON line output for the Lambda binaries (CloudWatch Logs
//! ingests one JSON object per line) and plain fmt output for the synth
//! CLI. Both respect `RUST_LOG` and default to `info`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber for a Lambda binary.
///
/// JSON events, no ANSI, target included. Call once per process.
pub fn init_lambda() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_ansi(false),
        )
        .init();
}

/// Install the global subscriber for the synth CLI.
pub fn init_cli() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
