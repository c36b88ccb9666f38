//! Error-keyed and result-keyed partial predicates.

use super::PartialPredicate;
use crate::decision::RetryDecision;

/// Looks only at failed attempts; successful values get no opinion.
#[derive(Debug, Clone)]
pub struct OnError<F>(pub F);

/// Looks only at produced values; errors get no opinion.
#[derive(Debug, Clone)]
pub struct OnResult<F>(pub F);

impl<T, E, C, F> PartialPredicate<T, E, C> for OnError<F>
where
    F: FnMut(&E, &C) -> Option<RetryDecision<T, E, C>>,
{
    fn decide(
        &mut self,
        outcome: &Result<T, E>,
        operation: &C,
    ) -> Option<RetryDecision<T, E, C>> {
        match outcome {
            Err(error) => (self.0)(error, operation),
            Ok(_) => None,
        }
    }
}

impl<T, E, C, F> PartialPredicate<T, E, C> for OnResult<F>
where
    F: FnMut(&T, &C) -> Option<RetryDecision<T, E, C>>,
{
    fn decide(
        &mut self,
        outcome: &Result<T, E>,
        operation: &C,
    ) -> Option<RetryDecision<T, E, C>> {
        match outcome {
            Ok(value) => (self.0)(value, operation),
            Err(_) => None,
        }
    }
}

/// Default retry (back-off delay, same operation) for every error `matches` accepts.
pub fn retry_on_error<T, E, C, M>(
    matches: M,
) -> OnError<impl FnMut(&E, &C) -> Option<RetryDecision<T, E, C>>>
where
    M: Fn(&E) -> bool,
{
    OnError(move |error: &E, _: &C| matches(error).then(RetryDecision::retry_default))
}

/// Default retry for every value `matches` accepts.
pub fn retry_on_result<T, E, C, M>(
    matches: M,
) -> OnResult<impl FnMut(&T, &C) -> Option<RetryDecision<T, E, C>>>
where
    M: Fn(&T) -> bool,
{
    OnResult(move |value: &T, _: &C| matches(value).then(RetryDecision::retry_default))
}
