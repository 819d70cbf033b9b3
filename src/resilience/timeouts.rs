//! Timeout enforcement for a single attempt.
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - A reply that arrives after the deadline lands in a dropped oneshot and is discarded

use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time;
use crate::dispatch::envelope::Envelope;

/// Why one attempt on one instance failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AttemptError {
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("instance inbox is closed")]
    InboxClosed,

    #[error("instance dropped the request without replying")]
    ReplyDropped,
}

impl AttemptError {
    /// Metric label for this failure.
    pub fn label(&self) -> &'static str {
        match self {
            AttemptError::Timeout(_) => "timeout",
            AttemptError::InboxClosed => "inbox_closed",
            AttemptError::ReplyDropped => "reply_dropped",
        }
    }
}

/// Forward `payload` to `inbox` and wait for the reply, all within `timeout`.
pub async fn forward<P, R>(
    inbox: &mpsc::Sender<Envelope<P, R>>,
    payload: P,
    timeout: Duration,
) -> Result<R, AttemptError> {
    let (reply_tx, reply_rx) = oneshot::channel();
    let attempt = async move {
        inbox
            .send(Envelope::new(payload, reply_tx))
            .await
            .map_err(|_| AttemptError::InboxClosed)?;
        reply_rx.await.map_err(|_| AttemptError::ReplyDropped)
    };

    match time::timeout(timeout, attempt).await {
        Ok(result) => result,
        Err(_) => Err(AttemptError::Timeout(timeout)),
    }
}
