//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`info`, `shard_router_core=debug`, ...).
pub const LOG_ENV: &str = "SHARD_ROUTER_LOG";

/// Install a `fmt` subscriber filtered by `SHARD_ROUTER_LOG`, falling back to
/// `default_directive`. Calling it twice is harmless.
pub fn init_tracing(default_directive: &str) {
    let filter = build_filter(std::env::var(LOG_ENV).ok().as_deref(), default_directive);
    if tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

fn build_filter(directive: Option<&str>, default_directive: &str) -> EnvFilter {
    directive
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_prefers_env_value() {
        let filter = build_filter(Some("shard_router_core=trace"), "warn");
        assert_eq!(filter.to_string(), "shard_router_core=trace");
    }

    #[test]
    fn test_filter_falls_back_on_blank() {
        assert_eq!(build_filter(Some("  "), "warn").to_string(), "warn");
        assert_eq!(build_filter(None, "info").to_string(), "info");
    }

    #[test]
    fn test_init_twice() {
        init_tracing("debug");
        init_tracing("debug");
    }
}
