//! Deadline-aware decorator for operations that declare a deadline.

use std::time::Instant;

use super::RetryPredicate;
use crate::decision::RetryDecision;
use crate::delay::duration_nanos;
use crate::operation::Operation;

/// Forces `Abort` (surfacing the outcome) once the operation's deadline has
/// passed, or when the requested back-off would end after it. Operations
/// without a deadline pass straight through to `inner`.
#[derive(Debug, Clone)]
pub struct DeadlinePredicate<P> {
    inner: P,
}

impl<P> DeadlinePredicate<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<T, E, C, P> RetryPredicate<T, E, C> for DeadlinePredicate<P>
where
    C: Operation,
    P: RetryPredicate<T, E, C>,
{
    fn decide(&mut self, outcome: &Result<T, E>, operation: &C) -> RetryDecision<T, E, C> {
        let Some(deadline) = operation.deadline() else {
            return self.inner.decide(outcome, operation);
        };
        let now = Instant::now();
        if now >= deadline {
            tracing::debug!("deadline passed, aborting retries");
            return RetryDecision::abort();
        }
        match self.inner.decide(outcome, operation) {
            RetryDecision::Retry {
                delay_nanos,
                operation,
            } => {
                let remaining = duration_nanos(deadline - now);
                if delay_nanos.unwrap_or(0) >= remaining {
                    tracing::debug!(
                        delay_nanos = delay_nanos.unwrap_or(0),
                        remaining_nanos = remaining,
                        "back-off would overrun deadline, aborting retries"
                    );
                    RetryDecision::abort()
                } else {
                    RetryDecision::Retry {
                        delay_nanos,
                        operation,
                    }
                }
            }
            abort => abort,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::operation::WithDeadline;

    struct AlwaysRetry(i64);

    impl<T, E, C> RetryPredicate<T, E, C> for AlwaysRetry {
        fn decide(&mut self, _: &Result<T, E>, _: &C) -> RetryDecision<T, E, C> {
            RetryDecision::retry_after(self.0)
        }
    }

    fn op() -> Result<i32, ()> {
        Ok(1)
    }

    #[test]
    fn no_deadline_passes_through() {
        let mut p = DeadlinePredicate::new(AlwaysRetry(5));
        let plain = op as fn() -> Result<i32, ()>;
        let d = p.decide(&Err::<i32, ()>(()), &plain);
        assert_eq!(d.delay_nanos(), Some(5));
    }

    #[test]
    fn passed_deadline_forces_abort() {
        let mut p = DeadlinePredicate::new(AlwaysRetry(0));
        let expired = WithDeadline::new(op as fn() -> Result<i32, ()>, Instant::now());
        assert!(p.decide(&Err::<i32, ()>(()), &expired).is_abort());
    }

    #[test]
    fn back_off_past_deadline_forces_abort() {
        let mut p = DeadlinePredicate::new(AlwaysRetry(duration_nanos(Duration::from_secs(60))));
        let bounded =
            WithDeadline::within(op as fn() -> Result<i32, ()>, Duration::from_secs(30)).unwrap();
        assert!(p.decide(&Err::<i32, ()>(()), &bounded).is_abort());
    }

    #[test]
    fn back_off_within_deadline_is_kept() {
        let mut p = DeadlinePredicate::new(AlwaysRetry(1_000));
        let bounded =
            WithDeadline::within(op as fn() -> Result<i32, ()>, Duration::from_secs(30)).unwrap();
        assert_eq!(p.decide(&Err::<i32, ()>(()), &bounded).delay_nanos(), Some(1_000));
    }
}
