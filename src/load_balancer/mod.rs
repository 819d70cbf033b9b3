//! Instance registry and selection.
//!
//! # Data Flow
//! ```text
//! Manager spawns instance → registry.rs (append, never removed)
//! Dispatcher needs a target
//!     → registry.rs (take the lock)
//!     → round_robin.rs (scan from cursor, skip disabled)
//!     → instance.rs (eligibility = disabled_until not in the future)
//!     → SelectedInstance or NoAliveInstances
//! Attempt fails → registry.rs (disable for an interval, reselect under one lock)
//! ```
//!
//! # Design Decisions
//! - One mutex guards the instance list and the cursor together
//! - Disablement is time-bounded, recovery needs no signal
//! - The registry is generic over the inbox message type

pub mod instance;
pub mod registry;
pub mod round_robin;

pub use instance::{Instance, InstanceId};
pub use registry::{InstanceStatus, Registry, SelectError, SelectedInstance};
