//! Request dispatch with failover.
//!
//! # Data Flow
//! ```text
//! caller → Dispatcher::request(payload)
//!     → registry.next_alive()
//!         - none eligible: Err(NoAliveInstances) on the reply channel
//!     → spawn retry task
//!         → resilience::timeouts::forward (send envelope, await reply, bounded)
//!             - reply: Ok(reply) on the reply channel
//!             - failure: registry.disable_and_next()
//!                 - no candidate or already tried: Err(Exhausted)
//!                 - otherwise loop with the new candidate
//! ```
//!
//! # Per-request states
//! ```text
//! Selecting → Forwarded → Succeeded
//!                       → TimedOut → Selecting
//!                       → Failed
//! ```

pub mod dispatcher;
pub mod envelope;
pub mod error;

use tokio::sync::{mpsc, oneshot};
use crate::load_balancer::InstanceId;

pub use dispatcher::Dispatcher;
pub use envelope::{Envelope, Reply};
pub use error::DispatchError;

/// Balances requests over registered instance inboxes.
pub trait LoadBalancer<P, R> {
    /// Submit `payload`. The receiver yields exactly one reply.
    fn request(&self, payload: P) -> oneshot::Receiver<Reply<R>>;

    /// Add an instance inbox to the rotation.
    fn register_instance(&self, inbox: mpsc::Sender<Envelope<P, R>>) -> InstanceId;
}
