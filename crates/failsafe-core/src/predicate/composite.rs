//! Ordered, first-match-wins combination of partial predicates.

use super::{PartialPredicate, RetryPredicate};
use crate::decision::RetryDecision;
use crate::delay::{BackoffConfig, DelayKeyFn, TypeKeyedDelays};

/// Asks each partial predicate in registration order; the first opinion wins
/// and later predicates are not evaluated. With no opinion the attempt's
/// outcome is surfaced unchanged.
///
/// Retry decisions that leave the delay open get one from the per-outcome
/// back-off sequences.
pub struct CompositePredicate<T, E, C> {
    partials: Vec<Box<dyn PartialPredicate<T, E, C>>>,
    delays: TypeKeyedDelays<T, E>,
}

impl<T, E, C> CompositePredicate<T, E, C> {
    pub fn new(partials: Vec<Box<dyn PartialPredicate<T, E, C>>>, backoff: BackoffConfig) -> Self {
        Self {
            partials,
            delays: TypeKeyedDelays::new(backoff),
        }
    }

    /// Split back-off sequences further by the caller's outcome categories.
    pub fn with_delay_key(mut self, key: DelayKeyFn<T, E>) -> Self {
        self.delays = self.delays.keyed_by(key);
        self
    }

    pub fn len(&self) -> usize {
        self.partials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partials.is_empty()
    }
}

impl<T, E, C> RetryPredicate<T, E, C> for CompositePredicate<T, E, C> {
    fn decide(&mut self, outcome: &Result<T, E>, operation: &C) -> RetryDecision<T, E, C> {
        let opinion = self
            .partials
            .iter_mut()
            .find_map(|partial| PartialPredicate::decide(partial, outcome, operation));
        match opinion {
            Some(RetryDecision::Retry {
                delay_nanos: None,
                operation,
            }) => RetryDecision::Retry {
                delay_nanos: Some(self.delays.next_delay_nanos(outcome)),
                operation,
            },
            Some(decision) => decision,
            None => RetryDecision::abort(),
        }
    }
}
