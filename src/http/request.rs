//! Request descriptor helpers.
//!
//! # Responsibilities
//! - Name the headers the server reads (request ID, caller time budget)
//! - Expose the per-request cancellation signal to handlers

use std::time::Duration;

use axum::http::HeaderName;

use crate::http::middleware::Request;
use crate::task::CancellationSignal;

/// Correlation header set by the outer request-ID layer.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Caller-supplied time budget in milliseconds.
pub const X_REQUEST_TIMEOUT_MS: HeaderName = HeaderName::from_static("x-request-timeout-ms");

/// Accessors over the parts of a request the core cares about.
pub trait RequestExt {
    /// Request ID, or `"-"` when the request has none.
    fn request_id(&self) -> &str;

    /// Budget from `x-request-timeout-ms`. Missing or malformed values yield `None`.
    fn timeout_budget(&self) -> Option<Duration>;

    /// Signal attached by the cancellation middleware.
    ///
    /// Requests that never passed through it get a fresh signal that nothing
    /// will fire.
    fn cancellation_signal(&self) -> CancellationSignal;
}

impl RequestExt for Request {
    fn request_id(&self) -> &str {
        self.headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
    }

    fn timeout_budget(&self) -> Option<Duration> {
        self.headers()
            .get(X_REQUEST_TIMEOUT_MS)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
    }

    fn cancellation_signal(&self) -> CancellationSignal {
        self.extensions()
            .get::<CancellationSignal>()
            .cloned()
            .unwrap_or_default()
    }
}
