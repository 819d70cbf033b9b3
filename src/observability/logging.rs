//! Structured logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use crate::config::ObservabilityConfig;

/// Build the log filter: `RUST_LOG` wins, otherwise the configured level for this crate.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("failover_balancer={}", config.log_level).into())
}

/// Install the global tracing subscriber. Call once at startup.
pub fn init_logging(config: &ObservabilityConfig) {
    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
