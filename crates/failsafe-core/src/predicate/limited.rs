//! Count-limiting decorator for partial predicates.

use super::PartialPredicate;
use crate::decision::RetryDecision;

/// Lets `inner` give at most `max` opinions, then defers forever.
///
/// The counter lives in the instance, and policies build a fresh instance
/// per call, so the limit is per call.
#[derive(Debug, Clone)]
pub struct CountLimited<P> {
    remaining: u32,
    inner: P,
}

impl<P> CountLimited<P> {
    pub fn new(max: u32, inner: P) -> Self {
        Self {
            remaining: max,
            inner,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl<T, E, C, P> PartialPredicate<T, E, C> for CountLimited<P>
where
    P: PartialPredicate<T, E, C>,
{
    fn decide(
        &mut self,
        outcome: &Result<T, E>,
        operation: &C,
    ) -> Option<RetryDecision<T, E, C>> {
        if self.remaining == 0 {
            return None;
        }
        let decision = self.inner.decide(outcome, operation)?;
        self.remaining -= 1;
        Some(decision)
    }
}
