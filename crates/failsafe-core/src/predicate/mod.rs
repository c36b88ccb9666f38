//! Retry predicates: turn an attempt outcome into a [`RetryDecision`].
//!
//! Partial predicates are small rules with an optional opinion; the
//! [`CompositePredicate`] asks them in registration order and the first
//! opinion wins. Predicates are stateful (counters, back-off cursors), so a
//! policy builds a fresh graph of them for every call.

mod composite;
mod deadline;
mod limited;
mod partial;

use crate::decision::RetryDecision;

pub use composite::CompositePredicate;
pub use deadline::DeadlinePredicate;
pub use limited::CountLimited;
pub use partial::{retry_on_error, retry_on_result, OnError, OnResult};

/// Authoritative rule: always produces a decision.
pub trait RetryPredicate<T, E, C> {
    fn decide(&mut self, outcome: &Result<T, E>, operation: &C) -> RetryDecision<T, E, C>;
}

/// A rule that may have no opinion (`None`) on an outcome.
pub trait PartialPredicate<T, E, C> {
    fn decide(
        &mut self,
        outcome: &Result<T, E>,
        operation: &C,
    ) -> Option<RetryDecision<T, E, C>>;
}

impl<T, E, C, P> RetryPredicate<T, E, C> for Box<P>
where
    P: RetryPredicate<T, E, C> + ?Sized,
{
    fn decide(&mut self, outcome: &Result<T, E>, operation: &C) -> RetryDecision<T, E, C> {
        (**self).decide(outcome, operation)
    }
}

impl<T, E, C, P> PartialPredicate<T, E, C> for Box<P>
where
    P: PartialPredicate<T, E, C> + ?Sized,
{
    fn decide(
        &mut self,
        outcome: &Result<T, E>,
        operation: &C,
    ) -> Option<RetryDecision<T, E, C>> {
        (**self).decide(outcome, operation)
    }
}

/// Never retries: aborts with the outcome unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl<T, E, C> RetryPredicate<T, E, C> for NoRetry {
    fn decide(&mut self, _outcome: &Result<T, E>, _operation: &C) -> RetryDecision<T, E, C> {
        RetryDecision::abort()
    }
}
