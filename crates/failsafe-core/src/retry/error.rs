//! Final error of a retried call.

use std::error::Error;
use std::fmt;

use crate::control::Interrupted;

/// The last error of a call together with the bounded history of earlier
/// failures (oldest first).
#[derive(Debug)]
pub struct Failure<E> {
    error: E,
    suppressed: Vec<E>,
    dropped: usize,
}

impl<E> Failure<E> {
    pub(crate) fn new(error: E, suppressed: Vec<E>, dropped: usize) -> Self {
        Self {
            error,
            suppressed,
            dropped,
        }
    }

    pub fn error(&self) -> &E {
        &self.error
    }

    /// Earlier failures kept in the chain, oldest first.
    pub fn suppressed(&self) -> &[E] {
        &self.suppressed
    }

    /// Earlier failures discarded because the chain was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Failures before the final one, including dropped ones.
    pub fn earlier(&self) -> usize {
        self.suppressed.len() + self.dropped
    }

    pub fn into_error(self) -> E {
        self.error
    }

    pub fn into_parts(self) -> (E, Vec<E>) {
        (self.error, self.suppressed)
    }
}

impl<E: fmt::Display> fmt::Display for Failure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if self.earlier() > 0 {
            write!(f, " (after {} earlier failure(s))", self.earlier())?;
        }
        Ok(())
    }
}

/// Shows as the final error itself, so its source is the final error's source.
impl<E> Error for Failure<E>
where
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.error.source()
    }
}

/// Error raised by a retried call.
///
/// `Propagated` and `Declared` display as the operation's own error.
/// `Execution` is a wrapper: the operation's error is its `source()`.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Unchecked or timeout failure, raised unchanged.
    Propagated(Failure<E>),
    /// Failure of the caller's declared error type.
    Declared(Failure<E>),
    /// Any other failure, wrapped.
    Execution(Failure<E>),
    /// Interrupted before an attempt, during a back-off sleep, or by the operation itself.
    Interrupted,
    /// A predicate asked for a negative back-off. Never retried.
    InvalidDecision { delay_nanos: i64 },
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Propagated(failure) | RetryError::Declared(failure) => {
                write!(f, "{}", failure)
            }
            RetryError::Execution(failure) => {
                write!(f, "execution failed")?;
                if failure.earlier() > 0 {
                    write!(f, " after {} earlier failure(s)", failure.earlier())?;
                }
                Ok(())
            }
            RetryError::Interrupted => write!(f, "call interrupted"),
            RetryError::InvalidDecision { delay_nanos } => {
                write!(f, "invalid retry decision: negative delay {}ns", delay_nanos)
            }
        }
    }
}

impl<E> Error for RetryError<E>
where
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RetryError::Propagated(failure) | RetryError::Declared(failure) => failure.source(),
            RetryError::Execution(failure) => Some(failure.error()),
            RetryError::Interrupted | RetryError::InvalidDecision { .. } => None,
        }
    }
}

impl<E> RetryError<E> {
    pub fn failure(&self) -> Option<&Failure<E>> {
        match self {
            RetryError::Propagated(f) | RetryError::Declared(f) | RetryError::Execution(f) => {
                Some(f)
            }
            RetryError::Interrupted | RetryError::InvalidDecision { .. } => None,
        }
    }

    pub fn into_failure(self) -> Option<Failure<E>> {
        match self {
            RetryError::Propagated(f) | RetryError::Declared(f) | RetryError::Execution(f) => {
                Some(f)
            }
            RetryError::Interrupted | RetryError::InvalidDecision { .. } => None,
        }
    }

    /// The operation's final error, if the call ended in one.
    pub fn into_error(self) -> Option<E> {
        self.into_failure().map(Failure::into_error)
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, RetryError::Interrupted)
    }
}

impl<E> From<Interrupted> for RetryError<E> {
    fn from(_: Interrupted) -> Self {
        RetryError::Interrupted
    }
}
