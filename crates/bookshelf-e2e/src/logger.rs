//! Logging setup for scenario runs.
//!
//! Page-object operations log through `tracing`: one `info` line per
//! operation, `debug` for every DOM interaction, `warn` for retries.
//! `RUST_LOG` overrides the default filter.

use std::sync::Once;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "bookshelf_e2e=info,bookshelf_browser=info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a subscriber that writes through the test harness's captured
/// output. Safe to call from every test.
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .with_test_writer()
            .with_target(false)
            .compact();

        // Another harness may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(filter())
            .with(fmt_layer)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
        tracing::info!("logging initialized twice without panicking");
    }
}
