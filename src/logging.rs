//! Logging and tracing infrastructure for siginspect.
//!
//! Reports go to stdout; tracing output always goes to stderr so the two
//! never interleave in a redirected report.

use std::sync::Once;
#[allow(unused_imports)]
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Only the first call in a process has any
/// effect, whatever its format.
pub fn init(format: LogFormat) {
    INIT.call_once(|| {
        let base = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        // A test harness may already own the global subscriber.
        let registry = tracing_subscriber::registry().with(env_filter());
        let _ = match format {
            LogFormat::Text => registry.with(base).try_init(),
            LogFormat::Json => registry
                .with(base.json().with_current_span(true))
                .try_init(),
        };

        debug!(?format, "siginspect tracing initialized");
    });
}

pub fn init_tracing() {
    init(LogFormat::Text);
}

/// Initialize tracing with JSON output for structured logging.
pub fn init_tracing_json() {
    init(LogFormat::Json);
}

/// Log an error at `error` level and hand it back.
#[macro_export]
macro_rules! log_error {
    ($err:expr) => {{
        let e = $err;
        tracing::error!(error = %e, "Operation failed");
        e
    }};
    ($err:expr, $msg:expr) => {{
        let e = $err;
        tracing::error!(error = %e, context = $msg, "Operation failed");
        e
    }};
}
