//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    InvalidBindAddress(String),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("task.poll_interval_ms ({poll_ms}) exceeds task.work_deadline_ms ({deadline_ms})")]
    PollIntervalExceedsDeadline { poll_ms: u64, deadline_ms: u64 },

    #[error("timeouts.request_secs ({request_secs}s) must exceed task.work_deadline_ms ({deadline_ms}ms)")]
    RequestCeilingTooShort { request_secs: u64, deadline_ms: u64 },

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let task = &config.task;
    if task.work_deadline_ms == 0 {
        errors.push(ValidationError::ZeroDuration("task.work_deadline_ms"));
    }
    if task.poll_interval_ms == 0 {
        errors.push(ValidationError::ZeroDuration("task.poll_interval_ms"));
    }
    if task.poll_interval_ms > task.work_deadline_ms {
        errors.push(ValidationError::PollIntervalExceedsDeadline {
            poll_ms: task.poll_interval_ms,
            deadline_ms: task.work_deadline_ms,
        });
    }

    let timeouts = &config.timeouts;
    if timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroDuration("timeouts.request_secs"));
    } else if timeouts.request_secs.saturating_mul(1_000) <= task.work_deadline_ms {
        errors.push(ValidationError::RequestCeilingTooShort {
            request_secs: timeouts.request_secs,
            deadline_ms: task.work_deadline_ms,
        });
    }
    if timeouts.default_budget_ms == Some(0) {
        errors.push(ValidationError::ZeroDuration("timeouts.default_budget_ms"));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.task.poll_interval_ms = 0;
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();

        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroDuration("task.poll_interval_ms")));
        assert!(errors.contains(&ValidationError::UnknownLogLevel("loud".into())));
    }

    #[test]
    fn poll_interval_cannot_exceed_deadline() {
        let mut config = ServerConfig::default();
        config.task.work_deadline_ms = 500;
        config.task.poll_interval_ms = 1_000;

        let errors = validate_config(&config).unwrap_err();

        assert_eq!(
            errors,
            vec![ValidationError::PollIntervalExceedsDeadline {
                poll_ms: 1_000,
                deadline_ms: 500,
            }]
        );
    }

    #[test]
    fn request_ceiling_must_outlast_task() {
        let mut config = ServerConfig::default();
        config.timeouts.request_secs = 5;

        let errors = validate_config(&config).unwrap_err();

        assert!(matches!(
            errors.as_slice(),
            [ValidationError::RequestCeilingTooShort { .. }]
        ));
    }
}
