//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → axum stops accepting → in-flight drain
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger_on_signal → graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: config and bind errors are fatal at startup
//! - Per-request failures never reach this layer

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
