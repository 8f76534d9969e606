//! Concurrent greeting server.
//!
//! Handlers share an atomic request counter and run a slow greeting task that
//! stops cooperatively when the caller's budget runs out or the caller goes
//! away.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod stats;
pub mod task;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use stats::RequestCounter;
