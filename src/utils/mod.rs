pub mod build_info;

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "stockbook=info";

static TRACING_INIT: Once = Once::new();

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
///
/// Events go to stderr so script output on stdout stays clean.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
