//! A single registered backend instance.

use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Stable identifier of an instance: its position in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub(crate) usize);

impl InstanceId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One backend worker as seen by the balancer.
pub struct Instance<T> {
    pub(crate) id: InstanceId,
    /// Sending side of the backend's inbox. The backend owns the receiver.
    pub(crate) inbox: mpsc::Sender<T>,
    /// `None` means the instance was never disabled.
    disabled_until: Option<Instant>,
}

impl<T> Instance<T> {
    pub(crate) fn new(id: InstanceId, inbox: mpsc::Sender<T>) -> Self {
        Self {
            id,
            inbox,
            disabled_until: None,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Return true if the instance may be selected at `now`.
    pub fn is_eligible(&self, now: Instant) -> bool {
        match self.disabled_until {
            Some(until) => until <= now,
            None => true,
        }
    }

    /// Exclude the instance until `until`. Overwrites any earlier deadline.
    pub fn disable_until(&mut self, until: Instant) {
        self.disabled_until = Some(until);
    }

    pub fn disabled_until(&self) -> Option<Instant> {
        self.disabled_until
    }

    /// Remaining time out of rotation, if any.
    pub fn disabled_for(&self, now: Instant) -> Option<Duration> {
        self.disabled_until
            .filter(|until| *until > now)
            .map(|until| until - now)
    }
}
