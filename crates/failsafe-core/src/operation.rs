//! The unit of work being retried.

use std::time::{Duration, Instant};

/// A zero-argument, possibly failing unit of work.
///
/// Operations are replaceable: a retry decision may hand the executor loop a
/// new operation for the next attempt, so an operation can carry its own
/// retry-specific state (e.g. which endpoint to hit next).
pub trait Operation {
    type Output;
    type Error;

    /// Run one attempt.
    fn call(&mut self) -> Result<Self::Output, Self::Error>;

    /// Intrinsic deadline, if the operation has one. Policies stop retrying
    /// operations whose deadline has passed.
    fn deadline(&self) -> Option<Instant> {
        None
    }
}

impl<F, T, E> Operation for F
where
    F: FnMut() -> Result<T, E>,
{
    type Output = T;
    type Error = E;

    fn call(&mut self) -> Result<T, E> {
        self()
    }
}

/// `timeout` from now, or `None` if that overflows `Instant`.
pub fn deadline_in(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

/// Wraps an operation with a fixed deadline.
#[derive(Debug, Clone)]
pub struct WithDeadline<O> {
    inner: O,
    deadline: Instant,
}

impl<O> WithDeadline<O> {
    pub fn new(inner: O, deadline: Instant) -> Self {
        Self { inner, deadline }
    }

    /// Deadline `timeout` from now. `None` when that instant is not
    /// representable (e.g. a timeout of `u64::MAX` seconds).
    pub fn within(inner: O, timeout: Duration) -> Option<Self> {
        deadline_in(timeout).map(|deadline| Self::new(inner, deadline))
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }

    pub fn into_inner(self) -> O {
        self.inner
    }

    /// Same deadline, different operation. Used when a decision substitutes
    /// a replacement for a deadline-bound operation.
    pub fn replace<P>(&self, inner: P) -> WithDeadline<P> {
        WithDeadline {
            inner,
            deadline: self.deadline,
        }
    }
}

impl<O: Operation> Operation for WithDeadline<O> {
    type Output = O::Output;
    type Error = O::Error;

    fn call(&mut self) -> Result<O::Output, O::Error> {
        self.inner.call()
    }

    fn deadline(&self) -> Option<Instant> {
        Some(self.deadline)
    }
}
