//! Configuration schema definitions.
//!
//! All types derive Serde traits: deserialized from config files and
//! serialized back when the effective configuration is logged at startup.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::task::TaskTiming;

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timing of the cancellable greeting task.
    pub task: TaskConfig,

    /// Request time limits.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ServerConfig {
    /// Render as a TOML document in the same shape the loader accepts.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Cancellable task timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TaskConfig {
    /// How long the task works before producing its result, in milliseconds.
    pub work_deadline_ms: u64,

    /// Period between deadline/cancellation checks, in milliseconds.
    pub poll_interval_ms: u64,
}

impl TaskConfig {
    pub fn timing(&self) -> TaskTiming {
        TaskTiming {
            work_deadline: Duration::from_millis(self.work_deadline_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            work_deadline_ms: 5_000,
            poll_interval_ms: 1_000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Hard ceiling on a whole request in seconds; answered with 408.
    pub request_secs: u64,

    /// Caller budget used when a request carries no `x-request-timeout-ms`.
    pub default_budget_ms: Option<u64>,
}

impl TimeoutConfig {
    pub fn request_ceiling(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn default_budget(&self) -> Option<Duration> {
        self.default_budget_ms.map(Duration::from_millis)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            default_budget_ms: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
