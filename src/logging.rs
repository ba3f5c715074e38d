//! Tracing setup
//!
//! Logs go to stderr so stdout stays parseable. `RUST_LOG` wins over the
//! configured filter.

use tracing_subscriber::EnvFilter;

/// Filter used when `-v` is passed once
pub const VERBOSE_FILTER: &str = "confplay=debug";

/// Filter used when `-v` is passed twice or more
pub const TRACE_FILTER: &str = "confplay=trace";

/// Pick the filter directive for a verbosity count
pub fn filter_for(verbosity: u8, configured: &str) -> String {
    match verbosity {
        0 => configured.to_string(),
        1 => VERBOSE_FILTER.to_string(),
        _ => TRACE_FILTER.to_string(),
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
