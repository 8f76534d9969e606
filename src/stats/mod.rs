//! Request statistics shared across handlers.
//!
//! # Design Decisions
//! - The counter is constructed by the server and injected into handlers
//! - Updates are lock-free atomic increments; no request ever waits on another

pub mod counter;

pub use counter::RequestCounter;
