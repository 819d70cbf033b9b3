//! Metrics collection and exposition.
//!
//! # Metrics
//! - `balancer_requests_total` (counter): requests by outcome
//! - `balancer_request_duration_seconds` (histogram): submission to final outcome
//! - `balancer_attempts_total` (counter): per-instance attempts by result
//! - `balancer_instances_registered` (gauge): registry size
//! - `balancer_instance_disabled_total` (counter): disablements applied

use std::net::SocketAddr;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tokio::time::Instant;

/// Final outcome of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    NoAlive,
    Exhausted,
    Cancelled,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::NoAlive => "no_alive",
            Outcome::Exhausted => "exhausted",
            Outcome::Cancelled => "cancelled",
        }
    }
}

/// Start the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(outcome: Outcome, started: Instant) {
    counter!("balancer_requests_total", "outcome" => outcome.as_str()).increment(1);
    histogram!("balancer_request_duration_seconds", "outcome" => outcome.as_str())
        .record(started.elapsed().as_secs_f64());
}

pub fn record_attempt(result: &'static str) {
    counter!("balancer_attempts_total", "result" => result).increment(1);
}

pub fn record_instances_registered(count: usize) {
    gauge!("balancer_instances_registered").set(count as f64);
}

pub fn record_instance_disabled() {
    counter!("balancer_instance_disabled_total").increment(1);
}
