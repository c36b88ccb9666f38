//! Retry policies.
//!
//! A [`RetryPolicy`] is immutable configuration: an ordered list of partial
//! predicate factories plus back-off and error-chain settings. Every call
//! builds a fresh predicate graph from it, so attempt counters and back-off
//! cursors never leak from one call into the next. Policies are cheap to
//! clone and can be shared between threads.

mod builder;
mod error;

use std::fmt;
use std::sync::Arc;

use crate::control::Interrupt;
use crate::delay::{BackoffConfig, DelayKeyFn};
use crate::operation::Operation;
use crate::predicate::{CompositePredicate, DeadlinePredicate, PartialPredicate};
use crate::retry::{run_with_retry, Classify, RetryError};

pub use builder::RetryPolicyBuilder;
pub use error::ConfigError;

pub(crate) type PartialFactory<T, E, C> =
    Arc<dyn Fn() -> Box<dyn PartialPredicate<T, E, C>> + Send + Sync>;

/// Reusable retry configuration for operations of type `C` producing
/// `Result<T, E>`.
pub struct RetryPolicy<T, E, C> {
    partials: Vec<PartialFactory<T, E, C>>,
    backoff: BackoffConfig,
    delay_key: Option<DelayKeyFn<T, E>>,
    max_exception_chain: usize,
}

impl<T, E, C> RetryPolicy<T, E, C> {
    pub fn builder() -> RetryPolicyBuilder<T, E, C> {
        RetryPolicyBuilder::new()
    }

    pub fn backoff(&self) -> &BackoffConfig {
        &self.backoff
    }

    pub fn max_exception_chain(&self) -> usize {
        self.max_exception_chain
    }

    /// Number of registered partial predicates.
    pub fn rules(&self) -> usize {
        self.partials.len()
    }

    /// A fresh, call-scoped predicate graph. Operations that declare a
    /// deadline stop being retried once it passes; the decorator is a
    /// pass-through for everything else.
    pub fn new_predicate(&self) -> DeadlinePredicate<CompositePredicate<T, E, C>> {
        let partials = self.partials.iter().map(|factory| factory()).collect();
        let mut composite = CompositePredicate::new(partials, self.backoff);
        if let Some(key) = &self.delay_key {
            composite = composite.with_delay_key(Arc::clone(key));
        }
        DeadlinePredicate::new(composite)
    }

    /// Run `operation` under this policy, blocking the calling thread.
    ///
    /// `classify` decides how the final error is raised (see
    /// [`crate::retry::ErrorClass`]); pass [`crate::retry::AllDeclared`]
    /// when the operation's error type is the one the caller handles.
    pub fn call<K>(&self, operation: C, classify: &K) -> Result<T, RetryError<E>>
    where
        C: Operation<Output = T, Error = E>,
        K: Classify<E> + ?Sized,
    {
        self.call_interruptible(operation, classify, &Interrupt::new())
    }

    /// Like [`RetryPolicy::call`], but stops promptly once `interrupt` is set.
    pub fn call_interruptible<K>(
        &self,
        operation: C,
        classify: &K,
        interrupt: &Interrupt,
    ) -> Result<T, RetryError<E>>
    where
        C: Operation<Output = T, Error = E>,
        K: Classify<E> + ?Sized,
    {
        let mut predicate = self.new_predicate();
        run_with_retry(
            operation,
            &mut predicate,
            classify,
            self.max_exception_chain,
            interrupt,
        )
    }
}

impl<T, E, C> Clone for RetryPolicy<T, E, C> {
    fn clone(&self) -> Self {
        Self {
            partials: self.partials.clone(),
            backoff: self.backoff,
            delay_key: self.delay_key.clone(),
            max_exception_chain: self.max_exception_chain,
        }
    }
}

impl<T, E, C> fmt::Debug for RetryPolicy<T, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("rules", &self.partials.len())
            .field("backoff", &self.backoff)
            .field("custom_delay_key", &self.delay_key.is_some())
            .field("max_exception_chain", &self.max_exception_chain)
            .finish()
    }
}

#[cfg(test)]
mod tests;
