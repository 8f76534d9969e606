//! Middleware composition and the cross-cutting layers the server installs.
//!
//! # Data Flow
//! ```text
//! Dispatcher route
//!     → Instrument (START log, timer)
//!     → Cancellation (per-request signal, caller budget)
//!     → terminal handler
//!     ← Cancellation (disarm drop guard, stop budget timer)
//!     ← Instrument (END log with elapsed)
//! ```

pub mod cancellation;
pub mod chain;
pub mod instrument;

pub use cancellation::Cancellation;
pub use chain::{
    from_fn, handler_fn, BoxFuture, ChainBuilder, Handler, HandlerChain, HandlerFn, Middleware,
    MiddlewareFn, Next, Request,
};
pub use instrument::{Instrument, InstrumentedHandler};
