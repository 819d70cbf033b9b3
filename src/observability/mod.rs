//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry / dispatcher / services produce:
//!     → logging.rs (structured log events, request id in every dispatch event)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stderr (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Metrics go through the `metrics` facade; without an installed recorder they are no-ops
//! - Log filter comes from RUST_LOG first, then the configured level

pub mod logging;
pub mod metrics;
