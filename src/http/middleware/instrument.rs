//! START/END request logging with timing.
//!
//! The END line is written when the timing record is dropped, so it appears
//! even if the transport abandons the request before the handler returns.

use axum::http::{Method, StatusCode};
use axum::response::Response;
use tokio::time::Instant;

use super::chain::{BoxFuture, Handler, Middleware, Next, Request};
use crate::http::request::RequestExt;

/// Logs every request passing through a chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Instrument;

impl Middleware for Instrument {
    fn handle(&self, request: Request, next: Next) -> BoxFuture<Response> {
        let timing = RequestTiming::start(&request);
        observe(timing, next.run(request))
    }
}

/// A single handler with the same START/END logging.
#[derive(Debug, Clone)]
pub struct InstrumentedHandler<H> {
    inner: H,
}

impl<H: Handler> InstrumentedHandler<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: Handler> Handler for InstrumentedHandler<H> {
    fn call(&self, request: Request) -> BoxFuture<Response> {
        let timing = RequestTiming::start(&request);
        observe(timing, self.inner.call(request))
    }
}

fn observe(mut timing: RequestTiming, inner: BoxFuture<Response>) -> BoxFuture<Response> {
    Box::pin(async move {
        let response = inner.await;
        timing.status = Some(response.status());
        response
    })
}

struct RequestTiming {
    method: Method,
    target: String,
    request_id: String,
    started: Instant,
    status: Option<StatusCode>,
}

impl RequestTiming {
    fn start(request: &Request) -> Self {
        let timing = Self {
            method: request.method().clone(),
            target: request.uri().to_string(),
            request_id: request.request_id().to_string(),
            started: Instant::now(),
            status: None,
        };
        tracing::info!(
            request_id = %timing.request_id,
            "START {} {:?}",
            timing.method,
            timing.target
        );
        timing
    }
}

impl Drop for RequestTiming {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        match self.status {
            Some(status) => tracing::info!(
                request_id = %self.request_id,
                status = status.as_u16(),
                "END {} {:?} ({:?})",
                self.method,
                self.target,
                elapsed
            ),
            None => tracing::warn!(
                request_id = %self.request_id,
                "END {} {:?} ({:?}) abandoned before completion",
                self.method,
                self.target,
                elapsed
            ),
        }
    }
}
