//! Tracing subscriber setup.
//!
//! Logs always go to stderr so the CLI report and `--json` output on stdout
//! stay machine-readable. `RUST_LOG` overrides the default level.

use std::sync::Once;
use tracing::debug;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static INIT: Once = Once::new();

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber. Only the first call has any effect.
pub fn init(format: LogFormat, default_level: &str) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(env_filter(default_level));

        // try_init: a test harness may already own the global subscriber
        let installed = match format {
            LogFormat::Text => registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_target(false),
                )
                .try_init(),
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_current_span(true)
                        .with_span_list(false),
                )
                .try_init(),
        };

        if installed.is_ok() {
            debug!(?format, "tracing initialized");
        }
    });
}

/// Human-readable logs at `info`.
pub fn init_tracing() {
    init(LogFormat::Text, "info");
}

/// JSON logs at `info`, one object per line.
pub fn init_tracing_json() {
    init(LogFormat::Json, "info");
}
