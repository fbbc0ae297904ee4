//! Tracing subscriber setup

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Filter used when `RUST_LOG` is unset
#[must_use]
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "info,todo_core=debug,todo_server=debug,tower_http=debug"
    } else {
        "info"
    }
}

/// Install the global subscriber, honoring `RUST_LOG` when set
///
/// # Errors
/// Returns an error if a global subscriber is already installed
pub fn init_logging(
    verbose: bool,
    json_format: bool,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let registry = tracing_subscriber::registry().with(filter);

    if json_format {
        let json_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true);

        registry.with(json_layer).try_init()
    } else {
        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE);

        registry.with(fmt_layer).try_init()
    }
}
