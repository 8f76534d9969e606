//! Endpoint handlers.
//!
//! `greet` is a plain async function; the others are handler objects. Both
//! shapes are registered through the same [`Handler`] interface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::http::middleware::{BoxFuture, Handler, Request};
use crate::http::request::RequestExt;
use crate::stats::RequestCounter;
use crate::task::{CancelPolicy, CancelReason, CancellableTask, TaskTiming};

pub const GREETING: &str = "Hello\n";
pub const TASK_GREETING: &str = "Hello Gopher!\n";
pub const NOT_FOUND: &str = "404 page not found\n";

/// Count the request and say hello.
pub async fn greet(counter: RequestCounter, _request: Request) -> Response {
    counter.increment();
    tracing::info!("GREETED");
    GREETING.into_response()
}

pub async fn not_found(_request: Request) -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND).into_response()
}

/// Reports the request counter without changing it.
#[derive(Debug, Clone)]
pub struct StatsHandler {
    counter: RequestCounter,
}

impl StatsHandler {
    pub fn new(counter: RequestCounter) -> Self {
        Self { counter }
    }
}

impl Handler for StatsHandler {
    fn call(&self, _request: Request) -> BoxFuture<Response> {
        let handled = self.counter.read();
        Box::pin(async move {
            tracing::info!("STATS PROVIDED");
            format!("Requests Handled: {handled}\n").into_response()
        })
    }
}

/// Slow greeting backed by a [`CancellableTask`].
///
/// The task runs on its own runtime task so that it can observe the
/// request's signal and wind down even after the transport has dropped the
/// handler future.
#[derive(Debug, Clone, Copy)]
pub struct GreetingTask {
    timing: TaskTiming,
    policy: CancelPolicy,
}

impl GreetingTask {
    pub fn new(timing: TaskTiming) -> Self {
        Self {
            timing,
            policy: CancelPolicy::Cooperative,
        }
    }

    pub fn with_policy(mut self, policy: CancelPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Handler for GreetingTask {
    fn call(&self, request: Request) -> BoxFuture<Response> {
        let task = CancellableTask::new(self.timing, request.cancellation_signal())
            .with_policy(self.policy);

        Box::pin(async move {
            tracing::info!("Handling greeting request");
            let joined = tokio::spawn(task.run()).await;
            tracing::info!("Handled greeting request");

            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(error = %e, "Greeting task failed");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            };

            if outcome.is_success() {
                return TASK_GREETING.into_response();
            }

            let reason = outcome.reason.unwrap_or(CancelReason::Cancelled);
            tracing::warn!(reason = %reason, "Context Error: {}", reason);
            (StatusCode::REQUEST_TIMEOUT, format!("{reason}\n")).into_response()
        })
    }
}
