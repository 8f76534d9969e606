//! Long-running request work with cooperative cancellation.
//!
//! # Data Flow
//! ```text
//! Request arrives
//!     → Cancellation middleware attaches a CancellationSignal
//!     → handler spawns CancellableTask with that signal
//!     → task ticks: deadline? → signal? → keep working
//!     → TaskOutcome mapped to 200 / 408
//! ```
//!
//! # Design Decisions
//! - Cancellation is a normal outcome, never an error or a panic
//! - Transition logic (TaskMachine) is separate from the clock that drives it
//! - Each request owns its own signal; firing one never touches another

pub mod cancellable;
pub mod signal;

pub use cancellable::{
    CancelPolicy, CancellableTask, Step, TaskMachine, TaskOutcome, TaskState, TaskTiming,
};
pub use signal::{CancelReason, CancellationSignal, DeadlineTimer, DropGuard};
