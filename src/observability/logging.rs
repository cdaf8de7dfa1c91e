//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins; otherwise the configured level applies to this crate
//!   and tower_http
//! - Initialization tolerates being called twice (tests)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default directives for a given level.
pub fn default_directives(level: &str) -> String {
    format!("nf_location={level},nf1={level},nf2={level},tower_http={level}")
}

/// Initialize the global tracing subscriber.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_crate_and_http_layer() {
        let d = default_directives("debug");
        assert!(d.contains("nf_location=debug"));
        assert!(d.contains("tower_http=debug"));
    }

    #[test]
    fn init_twice_is_harmless() {
        init_tracing("info");
        init_tracing("debug");
    }
}
