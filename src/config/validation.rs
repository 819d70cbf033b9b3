//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use crate::config::schema::{BalancerConfig, DispatchConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("service.inbox_capacity must be at least 1")]
    ZeroInboxCapacity,

    #[error("observability.metrics_address '{0}' is not a valid socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a full configuration.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = dispatch_errors(&config.dispatch);

    if config.service.inbox_capacity == 0 {
        errors.push(ValidationError::ZeroInboxCapacity);
    }
    if config.console.request_timeout_ms == 0 {
        errors.push(ValidationError::ZeroDuration("console.request_timeout_ms"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn dispatch_errors(dispatch: &DispatchConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if dispatch.response_timeout_ms == 0 {
        errors.push(ValidationError::ZeroDuration("dispatch.response_timeout_ms"));
    }
    if dispatch.disable_interval_ms == 0 {
        errors.push(ValidationError::ZeroDuration("dispatch.disable_interval_ms"));
    }
    errors
}
