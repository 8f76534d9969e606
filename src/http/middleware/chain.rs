//! Handler and middleware composition.
//!
//! Every endpoint is something that implements [`Handler`]. Plain async
//! functions are adapted with [`handler_fn`], so function-shaped and
//! object-shaped handlers share one code path.
//!
//! A [`HandlerChain`] is an immutable list of [`Middleware`] in front of one
//! terminal handler. Middlewares run in the order they were added and unwind in
//! reverse. Each receives a [`Next`] that is consumed on use, so a middleware
//! can delegate at most once; not calling it short-circuits the chain.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::Body;
use axum::response::Response;

/// Request type seen by handlers and middlewares.
pub type Request = axum::http::Request<Body>;

/// Owned, sendable future returned by handlers.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Anything exposing a single request-handling operation.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: Request) -> BoxFuture<Response>;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn call(&self, request: Request) -> BoxFuture<Response> {
        (**self).call(request)
    }
}

/// Adapter that turns an async function into a [`Handler`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

/// Wrap `f` so it can be registered like any other handler.
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    HandlerFn { f }
}

impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, request: Request) -> BoxFuture<Response> {
        Box::pin((self.f)(request))
    }
}

/// Cross-cutting behaviour wrapped around a handler.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, request: Request, next: Next) -> BoxFuture<Response>;
}

/// Adapter that turns an async closure into a [`Middleware`].
#[derive(Clone)]
pub struct MiddlewareFn<F> {
    f: F,
}

pub fn from_fn<F, Fut>(f: F) -> MiddlewareFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    MiddlewareFn { f }
}

impl<F, Fut> Middleware for MiddlewareFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn handle(&self, request: Request, next: Next) -> BoxFuture<Response> {
        Box::pin((self.f)(request, next))
    }
}

/// The remainder of the chain after the current middleware.
pub struct Next {
    middlewares: Arc<[Arc<dyn Middleware>]>,
    index: usize,
    terminal: Arc<dyn Handler>,
}

impl Next {
    /// Hand the request to the next middleware, or to the terminal handler.
    pub fn run(self, request: Request) -> BoxFuture<Response> {
        match self.middlewares.get(self.index).cloned() {
            Some(middleware) => {
                let next = Next {
                    middlewares: self.middlewares,
                    index: self.index + 1,
                    terminal: self.terminal,
                };
                middleware.handle(request, next)
            }
            None => self.terminal.call(request),
        }
    }
}

/// Middlewares terminated by exactly one handler.
///
/// Built once at startup and shared read-only between requests. A chain is
/// itself a [`Handler`], so chains can be nested.
#[derive(Clone)]
pub struct HandlerChain {
    middlewares: Arc<[Arc<dyn Middleware>]>,
    terminal: Arc<dyn Handler>,
}

impl HandlerChain {
    pub fn builder() -> ChainBuilder {
        ChainBuilder::default()
    }

    /// Number of middlewares in front of the terminal handler.
    pub fn depth(&self) -> usize {
        self.middlewares.len()
    }
}

impl Handler for HandlerChain {
    fn call(&self, request: Request) -> BoxFuture<Response> {
        Next {
            middlewares: Arc::clone(&self.middlewares),
            index: 0,
            terminal: Arc::clone(&self.terminal),
        }
        .run(request)
    }
}

/// Collects middlewares until the terminal handler is supplied.
#[derive(Default)]
pub struct ChainBuilder {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl ChainBuilder {
    /// Append a middleware; it runs after every middleware added before it.
    pub fn layer(self, middleware: impl Middleware) -> Self {
        self.layer_shared(Arc::new(middleware))
    }

    pub fn layer_shared(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn terminal(self, handler: impl Handler) -> HandlerChain {
        self.terminal_shared(Arc::new(handler))
    }

    pub fn terminal_shared(self, handler: Arc<dyn Handler>) -> HandlerChain {
        HandlerChain {
            middlewares: self.middlewares.into(),
            terminal: handler,
        }
    }
}
