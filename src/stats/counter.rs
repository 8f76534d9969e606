//! Process-wide request counter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic count of handled requests.
///
/// Cloning yields another handle to the same value, so the server can hand one
/// copy to each handler at registration time.
#[derive(Debug, Clone, Default)]
pub struct RequestCounter {
    value: Arc<AtomicU64>,
}

impl RequestCounter {
    /// Create a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one and return the new value.
    pub fn increment(&self) -> u64 {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Current value.
    pub fn read(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }
}
