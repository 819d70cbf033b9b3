//! Failover load balancer for channel-backed service instances.
//!
//! Requests go to registered instances in round-robin order. An instance that
//! does not answer within the response timeout is taken out of rotation for a
//! cool-down interval and the request moves on to the next candidate.

pub mod config;
pub mod dispatch;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod resilience;
pub mod service;

pub use config::schema::BalancerConfig;
pub use dispatch::{Dispatcher, DispatchError, Envelope, LoadBalancer, Reply};
pub use lifecycle::Shutdown;
pub use load_balancer::{InstanceId, Registry};
