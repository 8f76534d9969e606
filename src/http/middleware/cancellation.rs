//! Attaches a cancellation signal to every request.
//!
//! The signal fires with `DeadlineExceeded` once the caller's budget runs out
//! (`x-request-timeout-ms`, else the configured default) and with `Cancelled`
//! if the request future is dropped before the inner chain returns, which is
//! what the transport does when the client disconnects or the outer timeout
//! layer gives up.

use std::time::Duration;

use axum::response::Response;

use super::chain::{BoxFuture, Middleware, Next, Request};
use crate::http::request::RequestExt;
use crate::task::{CancelReason, CancellationSignal};

#[derive(Debug, Clone, Copy, Default)]
pub struct Cancellation {
    default_budget: Option<Duration>,
}

impl Cancellation {
    pub fn new(default_budget: Option<Duration>) -> Self {
        Self { default_budget }
    }
}

impl Middleware for Cancellation {
    fn handle(&self, mut request: Request, next: Next) -> BoxFuture<Response> {
        let signal = CancellationSignal::new();
        let budget = request.timeout_budget().or(self.default_budget);
        request.extensions_mut().insert(signal.clone());

        Box::pin(async move {
            let _timer = budget.map(|b| signal.cancel_after(b, CancelReason::DeadlineExceeded));
            let guard = signal.drop_guard();
            let response = next.run(request).await;
            guard.disarm();
            response
        })
    }
}
