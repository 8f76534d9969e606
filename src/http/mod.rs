//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum serve, request ID and timeout layers)
//!     → Dispatcher route (path → HandlerChain)
//!     → middleware/ (instrumentation, cancellation signal)
//!     → handlers.rs (greet, stats, greeting task)
//!     → response written by the transport
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;

pub use request::{RequestExt, X_REQUEST_ID, X_REQUEST_TIMEOUT_MS};
pub use server::{Dispatcher, HttpServer, ServerError};
