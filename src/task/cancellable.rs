//! Cooperatively cancellable unit of work.
//!
//! # State Machine
//! ```text
//!                  deadline elapsed, signal quiet
//!            ┌────────────────────────────────────▶ CompletedNormally
//!            │     deadline elapsed, signal fired
//!  Running ──┼────────────────────────────────────▶ CompletedOnDeadline
//!    │  ▲    │     signal fired (cooperative)
//!    └──┘    └────────────────────────────────────▶ Aborted
//!   tick
//! ```
//!
//! The deadline is checked before the signal on every tick, so a tick that
//! sees both resolves as `CompletedOnDeadline`.

use std::time::Duration;
use tokio::time::Instant;

use super::signal::{CancelReason, CancellationSignal};

/// Lifecycle of a task. Only `Running` has outgoing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Running,
    CompletedNormally,
    CompletedOnDeadline,
    Aborted,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        self != TaskState::Running
    }
}

/// How the task treats its cancellation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelPolicy {
    /// Stop at the first tick that sees the signal.
    #[default]
    Cooperative,
    /// Record the signal but keep working until the deadline.
    Ignore,
}

/// Work deadline and polling period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTiming {
    pub work_deadline: Duration,
    pub poll_interval: Duration,
}

impl Default for TaskTiming {
    fn default() -> Self {
        Self {
            work_deadline: Duration::from_secs(5),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Terminal result of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskOutcome {
    pub state: TaskState,
    /// Signal reason observed when the task finished.
    pub reason: Option<CancelReason>,
    /// Time from start to the deciding tick.
    pub elapsed: Duration,
}

impl TaskOutcome {
    /// The task produced its result.
    pub fn is_success(&self) -> bool {
        matches!(
            self.state,
            TaskState::CompletedNormally | TaskState::CompletedOnDeadline
        )
    }
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Done(TaskOutcome),
}

/// Clock-free transition logic, driven by whoever owns the ticks.
#[derive(Debug)]
pub struct TaskMachine {
    deadline: Duration,
    policy: CancelPolicy,
    outcome: Option<TaskOutcome>,
}

impl TaskMachine {
    pub fn new(deadline: Duration, policy: CancelPolicy) -> Self {
        Self {
            deadline,
            policy,
            outcome: None,
        }
    }

    pub fn state(&self) -> TaskState {
        self.outcome.map_or(TaskState::Running, |o| o.state)
    }

    /// Evaluate one tick at `elapsed` since start.
    ///
    /// Once terminal, every later call returns the same outcome.
    pub fn poll(&mut self, elapsed: Duration, signal: Option<CancelReason>) -> Step {
        if let Some(outcome) = self.outcome {
            return Step::Done(outcome);
        }

        let state = if elapsed >= self.deadline {
            match signal {
                None => TaskState::CompletedNormally,
                Some(_) => TaskState::CompletedOnDeadline,
            }
        } else if signal.is_some() && self.policy == CancelPolicy::Cooperative {
            TaskState::Aborted
        } else {
            return Step::Continue;
        };

        let outcome = TaskOutcome {
            state,
            reason: signal,
            elapsed,
        };
        self.outcome = Some(outcome);
        Step::Done(outcome)
    }
}

/// A bounded unit of work that checks for permission to continue each tick.
#[derive(Debug)]
pub struct CancellableTask {
    timing: TaskTiming,
    policy: CancelPolicy,
    signal: CancellationSignal,
}

impl CancellableTask {
    pub fn new(timing: TaskTiming, signal: CancellationSignal) -> Self {
        Self {
            timing,
            policy: CancelPolicy::Cooperative,
            signal,
        }
    }

    pub fn with_policy(mut self, policy: CancelPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run until a terminal state is reached.
    pub async fn run(self) -> TaskOutcome {
        let start = Instant::now();
        let mut machine = TaskMachine::new(self.timing.work_deadline, self.policy);

        loop {
            match machine.poll(start.elapsed(), self.signal.reason()) {
                Step::Done(outcome) => {
                    match outcome.state {
                        TaskState::Aborted => tracing::info!(
                            reason = ?outcome.reason,
                            elapsed = ?outcome.elapsed,
                            "Task aborted"
                        ),
                        state => tracing::debug!(
                            state = ?state,
                            elapsed = ?outcome.elapsed,
                            "Task completed"
                        ),
                    }
                    return outcome;
                }
                Step::Continue => {
                    tracing::info!("Greetings are hard. Thinking...");
                    tokio::time::sleep(self.timing.poll_interval).await;
                }
            }
        }
    }
}
