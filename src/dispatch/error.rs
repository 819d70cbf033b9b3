//! Dispatch errors delivered to callers.

use thiserror::Error;
use crate::load_balancer::SelectError;

/// Why a request could not be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No instance was eligible when the request was submitted.
    #[error("Request can not be processed: no alive instances")]
    NoAliveInstances,

    /// Reselection after a failed attempt found nothing new to try.
    #[error("Request can not be processed: gave up after {attempts} attempt(s)")]
    Exhausted { attempts: usize },
}

impl From<SelectError> for DispatchError {
    fn from(err: SelectError) -> Self {
        match err {
            SelectError::NoAliveInstances => DispatchError::NoAliveInstances,
        }
    }
}
