//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct BalancerConfig {
    /// Dispatch timings (timeout and cool-down).
    pub dispatch: DispatchConfig,

    /// Settings for the bundled time service instances.
    pub service: ServiceConfig,

    /// Interactive console settings.
    pub console: ConsoleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Timings used by the dispatcher retry loop.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DispatchConfig {
    /// How long an instance stays out of rotation after a failed attempt.
    pub disable_interval_ms: u64,

    /// Per-attempt bound on forwarding a request and receiving its reply.
    pub response_timeout_ms: u64,
}

impl DispatchConfig {
    pub fn disable_interval(&self) -> Duration {
        Duration::from_millis(self.disable_interval_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            disable_interval_ms: 60_000,
            response_timeout_ms: 4_000,
        }
    }
}

/// Time service instance settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Buffered envelopes per instance inbox.
    pub inbox_capacity: usize,

    /// Upper bound (exclusive) for the random average response time.
    pub max_avg_response_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            inbox_capacity: 10,
            max_avg_response_ms: 3_000,
        }
    }
}

/// Interactive console settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsoleConfig {
    /// How long the `time` command waits before printing "Timeout".
    pub request_timeout_ms: u64,

    /// Instances spawned before the prompt appears.
    pub initial_instances: usize,
}

impl ConsoleConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 7_000,
            initial_instances: 0,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
