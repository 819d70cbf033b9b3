//! Request envelope passed to instance inboxes.

use tokio::sync::oneshot;
use crate::dispatch::error::DispatchError;

/// Outcome delivered to a caller of `request`.
pub type Reply<R> = Result<R, DispatchError>;

/// A payload paired with its single-use reply slot.
#[derive(Debug)]
pub struct Envelope<P, R> {
    pub payload: P,
    pub reply_to: oneshot::Sender<R>,
}

impl<P, R> Envelope<P, R> {
    pub fn new(payload: P, reply_to: oneshot::Sender<R>) -> Self {
        Self { payload, reply_to }
    }

    /// Send the reply. Returns false if nobody is waiting anymore,
    /// which is expected after the dispatcher gave up on this attempt.
    pub fn reply(self, value: R) -> bool {
        self.reply_to.send(value).is_ok()
    }
}
