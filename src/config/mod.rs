//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BalancerConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → new dispatch timings swapped into the running Dispatcher
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so an empty file is a valid config
//! - Only dispatch timings are hot-reloadable; the rest applies at startup
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::BalancerConfig;
pub use schema::ConsoleConfig;
pub use schema::DispatchConfig;
pub use schema::ObservabilityConfig;
pub use schema::ServiceConfig;
