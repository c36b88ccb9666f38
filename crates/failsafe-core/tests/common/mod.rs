//! Shared fixtures for policy integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use failsafe_core::Operation;

/// Operation that replays a fixed list of outcomes and counts its calls.
/// Running past the end of the script is a test bug and panics.
pub struct Scripted<T, E> {
    outcomes: VecDeque<Result<T, E>>,
    calls: Arc<AtomicUsize>,
}

impl<T, E> Scripted<T, E> {
    pub fn new(outcomes: impl IntoIterator<Item = Result<T, E>>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter; stays valid after the operation is moved into a call.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl<T, E> Operation for Scripted<T, E> {
    type Output = T;
    type Error = E;

    fn call(&mut self) -> Result<T, E> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .pop_front()
            .unwrap_or_else(|| panic!("scripted operation called past its script"))
    }
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
