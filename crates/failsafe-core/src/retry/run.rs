//! Retry loop: run an operation until its predicate says stop.

use std::time::Duration;

use super::chain::ErrorChain;
use super::classify::{Classify, ErrorClass};
use super::error::RetryError;
use crate::control::Interrupt;
use crate::decision::RetryDecision;
use crate::operation::Operation;
use crate::predicate::RetryPredicate;

/// Default cap on the number of earlier failures kept in an error chain.
pub const DEFAULT_MAX_EXCEPTION_CHAIN: usize = 10;

/// Runs `operation` until `predicate` returns `Abort`, sleeping between
/// attempts for the delay each `Retry` asks for.
///
/// `interrupt` is checked before the first attempt and before every sleep,
/// and the sleep itself wakes up as soon as it is set. Errors classified as
/// [`ErrorClass::Interrupted`] end the call without consulting the predicate.
pub fn run_with_retry<O, P, K>(
    mut operation: O,
    predicate: &mut P,
    classify: &K,
    max_exception_chain: usize,
    interrupt: &Interrupt,
) -> Result<O::Output, RetryError<O::Error>>
where
    O: Operation,
    P: RetryPredicate<O::Output, O::Error, O> + ?Sized,
    K: Classify<O::Error> + ?Sized,
{
    let mut chain = ErrorChain::new(max_exception_chain);
    let mut attempt = 1u64;
    interrupt.check()?;
    let mut outcome = operation.call();
    loop {
        if let Err(e) = &outcome {
            if classify.classify(e) == ErrorClass::Interrupted {
                tracing::debug!(attempt, "operation interrupted");
                return Err(RetryError::Interrupted);
            }
        }
        match predicate.decide(&outcome, &operation) {
            RetryDecision::Retry {
                delay_nanos,
                operation: replacement,
            } => {
                let delay_nanos = delay_nanos.unwrap_or(0);
                if delay_nanos < 0 {
                    return Err(RetryError::InvalidDecision { delay_nanos });
                }
                tracing::debug!(attempt, delay_nanos, failed = outcome.is_err(), "retrying");
                if let Err(e) = outcome {
                    chain.push(e);
                }
                interrupt.check()?;
                if delay_nanos > 0 {
                    interrupt.sleep(Duration::from_nanos(delay_nanos as u64))?;
                }
                if let Some(next) = replacement {
                    operation = next;
                }
                attempt = attempt.saturating_add(1);
                outcome = operation.call();
            }
            RetryDecision::Abort(result) => {
                let last = match result {
                    None => outcome,
                    Some(Ok(value)) => Ok(value),
                    Some(Err(error)) => {
                        if let Err(previous) = outcome {
                            chain.push(previous);
                        }
                        Err(error)
                    }
                };
                tracing::debug!(attempt, failed = last.is_err(), "retry aborted");
                return last.map_err(|error| raise(error, chain, classify));
            }
        }
    }
}

fn raise<E, K>(error: E, chain: ErrorChain<E>, classify: &K) -> RetryError<E>
where
    K: Classify<E> + ?Sized,
{
    let class = classify.classify(&error);
    let failure = chain.into_failure(error);
    match class {
        ErrorClass::Unchecked | ErrorClass::Timeout => RetryError::Propagated(failure),
        ErrorClass::Declared => RetryError::Declared(failure),
        ErrorClass::Undeclared => RetryError::Execution(failure),
        ErrorClass::Interrupted => RetryError::Interrupted,
    }
}
