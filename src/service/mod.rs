//! Toy backend used by the console: a time service and its manager.
//!
//! # Data Flow
//! ```text
//! manager.rs spawn()
//!     → time_service.rs task consuming its inbox
//!     → inbox sender handed to the dispatcher for registration
//!
//! manager.rs kill()
//!     → service stops consuming but keeps its inbox open
//!     → the dispatcher only notices through attempt timeouts
//! ```

pub mod manager;
pub mod time_service;

pub use manager::ServiceManager;
pub use time_service::{TimeEnvelope, TimeService};
