//! Bounded history of failures accumulated during a retry run.

use std::collections::VecDeque;

use super::error::Failure;

/// Keeps at most `cap` earlier errors, dropping the oldest first. The number
/// of dropped errors is recorded so truncation is visible.
#[derive(Debug)]
pub struct ErrorChain<E> {
    cap: usize,
    errors: VecDeque<E>,
    dropped: usize,
}

impl<E> ErrorChain<E> {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            errors: VecDeque::with_capacity(cap.min(16)),
            dropped: 0,
        }
    }

    pub fn push(&mut self, error: E) {
        self.errors.push_back(error);
        if self.errors.len() > self.cap {
            self.errors.pop_front();
            self.dropped += 1;
            if self.dropped == 1 {
                tracing::warn!(cap = self.cap, "error chain full, dropping oldest failures");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Attach the chain to `error` as its suppressed history.
    pub fn into_failure(self, error: E) -> Failure<E> {
        Failure::new(error, self.errors.into(), self.dropped)
    }
}
