//! Cooperative cancellation for long comparisons.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::{DiffError, Result, Stage};

/// Cancellation flag plus an optional deadline, checked between pages and
/// inside the text diff.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel automatically once `timeout` has elapsed from now.
    ///
    /// A timeout too large to represent means no deadline.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.deadline = timeout.and_then(deadline_after);
        self
    }

    /// Like [`Self::with_timeout`], but never extends an existing deadline.
    pub fn limited_to(&self, timeout: Option<Duration>) -> Self {
        let deadline = match (self.deadline, timeout.and_then(deadline_after)) {
            (Some(current), Some(limit)) => Some(current.min(limit)),
            (current, limit) => current.or(limit),
        };
        Self {
            flag: Arc::clone(&self.flag),
            deadline,
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Fail with [`DiffError::Cancelled`] if cancellation was requested.
    pub fn check(&self, stage: Stage) -> Result<()> {
        if self.is_cancelled() {
            Err(DiffError::Cancelled { stage })
        } else {
            Ok(())
        }
    }
}

fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}
