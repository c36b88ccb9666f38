//! Retry decision model.
//!
//! A [`RetryDecision`] is what a retry predicate hands back to the executor
//! loop after each attempt: either run again (possibly a different operation,
//! possibly after a delay) or stop and surface a final result.

use std::fmt;

/// Decision returned by a retry predicate for one attempt outcome.
///
/// `T` is the operation's value type, `E` its error type, `C` the operation
/// type itself (so a decision can substitute a replacement operation).
pub enum RetryDecision<T, E, C> {
    /// Run another attempt.
    Retry {
        /// Additional wait before the next attempt, in nanoseconds.
        /// `None` lets the backoff chain pick the delay. Negative values are
        /// rejected by the executor loop.
        delay_nanos: Option<i64>,
        /// Operation for the next attempt; `None` re-runs the current one.
        operation: Option<C>,
    },
    /// Stop retrying.
    ///
    /// `None` surfaces the last attempt's outcome unchanged. `Some(Ok(v))`
    /// returns `v`, `Some(Err(e))` raises `e`.
    Abort(Option<Result<T, E>>),
}

impl<T, E, C> RetryDecision<T, E, C> {
    /// Retry the same operation, delay chosen by the backoff chain.
    pub fn retry_default() -> Self {
        RetryDecision::Retry {
            delay_nanos: None,
            operation: None,
        }
    }

    /// Retry the same operation after exactly `delay_nanos`.
    pub fn retry_after(delay_nanos: i64) -> Self {
        RetryDecision::Retry {
            delay_nanos: Some(delay_nanos),
            operation: None,
        }
    }

    /// Retry with a replacement operation, delay chosen by the backoff chain.
    pub fn retry_with(operation: C) -> Self {
        RetryDecision::Retry {
            delay_nanos: None,
            operation: Some(operation),
        }
    }

    /// Retry with a replacement operation after exactly `delay_nanos`.
    pub fn retry_with_after(operation: C, delay_nanos: i64) -> Self {
        RetryDecision::Retry {
            delay_nanos: Some(delay_nanos),
            operation: Some(operation),
        }
    }

    /// Stop and surface the last outcome as-is.
    pub fn abort() -> Self {
        RetryDecision::Abort(None)
    }

    /// Stop and return `value`.
    pub fn abort_with_result(value: T) -> Self {
        RetryDecision::Abort(Some(Ok(value)))
    }

    /// Stop and raise `error`.
    pub fn abort_with_error(error: E) -> Self {
        RetryDecision::Abort(Some(Err(error)))
    }

    pub fn is_retry(&self) -> bool {
        matches!(self, RetryDecision::Retry { .. })
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, RetryDecision::Abort(_))
    }

    /// Delay of a `Retry` decision, if one was fixed.
    pub fn delay_nanos(&self) -> Option<i64> {
        match self {
            RetryDecision::Retry { delay_nanos, .. } => *delay_nanos,
            RetryDecision::Abort(_) => None,
        }
    }
}

impl<T, E, C> fmt::Debug for RetryDecision<T, E, C>
where
    T: fmt::Debug,
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryDecision::Retry {
                delay_nanos,
                operation,
            } => f
                .debug_struct("Retry")
                .field("delay_nanos", delay_nanos)
                .field("replaces_operation", &operation.is_some())
                .finish(),
            RetryDecision::Abort(result) => f.debug_tuple("Abort").field(result).finish(),
        }
    }
}
