//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Ctrl+C / EOF / `quit` in the console
//!     → shutdown.rs (broadcast)
//!     → every time service task exits
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
