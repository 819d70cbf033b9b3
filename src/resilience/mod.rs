//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt on one instance:
//!     → timeouts.rs (send envelope + await reply under one deadline)
//!     → AttemptError on timeout, closed inbox or dropped reply slot
//!     → caller disables the instance and picks another
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt has a deadline
//! - The inbox send counts against the deadline, a full inbox cannot stall a request
//! - No backoff between attempts: the next attempt targets a different instance

pub mod timeouts;
