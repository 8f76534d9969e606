//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Register handlers against paths (Dispatcher)
//! - Wrap every route in the shared middleware chain
//! - Wire up outer tower layers (request ID, timeout ceiling)
//! - Bind and serve until the shutdown signal fires

use std::future::Future;
use std::sync::Arc;

use axum::response::Response;
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;

use crate::config::{ListenerConfig, ServerConfig};
use crate::http::handlers::{self, GreetingTask, StatsHandler};
use crate::http::middleware::{
    handler_fn, Cancellation, Handler, HandlerChain, Instrument, Middleware, Request,
};
use crate::stats::RequestCounter;
use crate::task::CancelPolicy;

/// Errors that end the server process.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Maps paths to handlers, each behind the same middleware chain.
pub struct Dispatcher {
    middlewares: Vec<Arc<dyn Middleware>>,
    routes: Vec<(String, Arc<dyn Handler>)>,
    fallback: Option<Arc<dyn Handler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
            routes: Vec::new(),
            fallback: None,
        }
    }

    /// Add a middleware in front of every route, after those already added.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Register an object-shaped handler.
    pub fn handle(mut self, path: &str, handler: impl Handler) -> Self {
        let handler: Arc<dyn Handler> = Arc::new(handler);
        self.routes.push((path.to_string(), handler));
        self
    }

    /// Register a function-shaped handler.
    pub fn handle_fn<F, Fut>(self, path: &str, f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.handle(path, handler_fn(f))
    }

    /// Handler for paths nothing else matched.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Some(Arc::new(handler));
        self
    }

    /// Build the axum router.
    ///
    /// # Panics
    ///
    /// Panics if a path is registered twice or is not a valid axum route.
    pub fn into_router(self) -> Router {
        let wrap = |terminal: Arc<dyn Handler>| -> HandlerChain {
            self.middlewares
                .iter()
                .cloned()
                .fold(HandlerChain::builder(), |builder, m| builder.layer_shared(m))
                .terminal_shared(terminal)
        };

        let mut router = Router::new();
        for (path, handler) in &self.routes {
            let chain = wrap(Arc::clone(handler));
            tracing::debug!(path = %path, middlewares = chain.depth(), "Route registered");
            router = router.route(path, any(move |request: Request| chain.call(request)));
        }

        if let Some(handler) = &self.fallback {
            let chain = wrap(Arc::clone(handler));
            router = router.fallback(move |request: Request| chain.call(request));
        }

        router
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP server for the greeting endpoints.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    counter: RequestCounter,
}

impl HttpServer {
    /// Create a new HTTP server sharing `counter` between its handlers.
    pub fn new(config: ServerConfig, counter: RequestCounter) -> Self {
        let router = Self::build_router(&config, counter.clone());
        Self {
            router,
            config,
            counter,
        }
    }

    /// Build the router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, counter: RequestCounter) -> Router {
        let timing = config.task.timing();
        let stats = StatsHandler::new(counter.clone());

        Dispatcher::new()
            .layer(Instrument)
            .layer(Cancellation::new(config.timeouts.default_budget()))
            .handle_fn("/greet", move |request| {
                handlers::greet(counter.clone(), request)
            })
            .handle("/stats", stats)
            .handle("/", GreetingTask::new(timing))
            .handle(
                "/uncancellable",
                GreetingTask::new(timing).with_policy(CancelPolicy::Ignore),
            )
            .fallback(handler_fn(handlers::not_found))
            .into_router()
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(config.timeouts.request_ceiling())),
            )
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn counter(&self) -> &RequestCounter {
        &self.counter
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr().map_err(ServerError::Serve)?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await
            .map_err(ServerError::Serve)?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Bind the configured listen address.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ServerError> {
    let listener = TcpListener::bind(&config.bind_address)
        .await
        .map_err(|source| ServerError::Bind {
            address: config.bind_address.clone(),
            source,
        })?;

    if let Ok(addr) = listener.local_addr() {
        tracing::info!(address = %addr, "Listener bound");
    }
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::{X_REQUEST_ID, X_REQUEST_TIMEOUT_MS};
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::time::Duration;
    use tower::ServiceExt;

    fn get(path: &str) -> Request {
        axum::http::Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(server: &HttpServer, request: Request) -> (StatusCode, String) {
        let response = server.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn server() -> HttpServer {
        HttpServer::new(ServerConfig::default(), RequestCounter::new())
    }

    #[tokio::test]
    async fn greet_three_times_then_stats() {
        let server = server();
        for _ in 0..3 {
            let (status, body) = send(&server, get("/greet")).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, handlers::GREETING);
        }

        let (status, body) = send(&server, get("/stats")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Requests Handled: 3\n");
        assert_eq!(server.counter().read(), 3);
    }

    #[tokio::test]
    async fn stats_does_not_count_itself() {
        let server = server();
        send(&server, get("/stats")).await;
        let (_, body) = send(&server, get("/stats")).await;
        assert_eq!(body, "Requests Handled: 0\n");
    }

    #[tokio::test]
    async fn unknown_path_falls_back() {
        let (status, body) = send(&server(), get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, handlers::NOT_FOUND);
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let response = server().router().oneshot(get("/greet")).await.unwrap();
        assert!(response.headers().contains_key(X_REQUEST_ID));
    }

    #[tokio::test(start_paused = true)]
    async fn short_budget_yields_request_timeout() {
        let request = axum::http::Request::builder()
            .uri("/")
            .header(X_REQUEST_TIMEOUT_MS, "1000")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&server(), request).await;

        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body, "deadline exceeded\n");
    }

    #[tokio::test(start_paused = true)]
    async fn task_completes_after_full_deadline() {
        let started = tokio::time::Instant::now();
        let (status, body) = send(&server(), get("/")).await;

        assert!(started.elapsed() >= Duration::from_secs(5));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, handlers::TASK_GREETING);
    }

    #[tokio::test(start_paused = true)]
    async fn configured_default_budget_applies() {
        let mut config = ServerConfig::default();
        config.timeouts.default_budget_ms = Some(2_000);
        let server = HttpServer::new(config, RequestCounter::new());

        let (status, _) = send(&server, get("/")).await;

        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn uncancellable_route_ignores_budget() {
        let request = axum::http::Request::builder()
            .uri("/uncancellable")
            .header(X_REQUEST_TIMEOUT_MS, "1000")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&server(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, handlers::TASK_GREETING);
    }

    #[tokio::test]
    async fn dispatcher_accepts_both_handler_shapes() {
        let router = Dispatcher::new()
            .handle_fn("/fn", |_request| async { "from fn".into_response() })
            .handle("/obj", StatsHandler::new(RequestCounter::new()))
            .into_router();

        let response = router.clone().oneshot(get("/fn")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let response = router.oneshot(get("/obj")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
