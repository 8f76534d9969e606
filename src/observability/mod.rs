//! Observability subsystem.
//!
//! # Design Decisions
//! - Human-readable line logging through `tracing`
//! - Request ID is a field on START/END lines
//! - `RUST_LOG` overrides the configured level

pub mod logging;

pub use logging::init_logging;
