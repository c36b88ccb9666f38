//! Fluent assembly of a [`RetryPolicy`].

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use super::{ConfigError, PartialFactory, RetryPolicy};
use crate::config::RetryConfig;
use crate::decision::RetryDecision;
use crate::delay::{delay_key_fn, BackoffConfig, DelayKeyFn};
use crate::predicate::{CountLimited, OnError, OnResult, PartialPredicate};
use crate::retry::DEFAULT_MAX_EXCEPTION_CHAIN;

const DEFAULT_INITIAL_RETRIES: u32 = 3;
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);
const DEFAULT_JITTER_FACTOR: f64 = 0.2;

/// Collects partial predicates (evaluated in registration order, first
/// opinion wins) and back-off knobs. Validation happens in [`build`].
///
/// [`build`]: RetryPolicyBuilder::build
#[must_use]
pub struct RetryPolicyBuilder<T, E, C> {
    partials: Vec<PartialFactory<T, E, C>>,
    delay_key: Option<DelayKeyFn<T, E>>,
    initial_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
    jitter_factor: f64,
    max_exception_chain: usize,
}

impl<T, E, C> Default for RetryPolicyBuilder<T, E, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E, C> RetryPolicyBuilder<T, E, C> {
    pub fn new() -> Self {
        Self {
            partials: Vec::new(),
            delay_key: None,
            initial_retries: DEFAULT_INITIAL_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            jitter_factor: DEFAULT_JITTER_FACTOR,
            max_exception_chain: DEFAULT_MAX_EXCEPTION_CHAIN,
        }
    }

    /// Number of retries (per outcome category) that happen immediately,
    /// before back-off starts. Default 3.
    pub fn with_initial_retries(mut self, retries: u32) -> Self {
        self.initial_retries = retries;
        self
    }

    /// First non-zero back-off delay. Default 1ms.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Back-off cap. Default 5s.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Jitter as a fraction of the delay, within `[0, 1]`. Default 0.2.
    pub fn with_jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = factor;
        self
    }

    /// Most earlier failures kept on the final error. Default 10.
    pub fn with_max_exception_chain(mut self, max: usize) -> Self {
        self.max_exception_chain = max;
        self
    }

    /// Apply every back-off and chain knob from a config section.
    pub fn with_config(self, cfg: &RetryConfig) -> Self {
        self.with_initial_retries(cfg.initial_retries)
            .with_initial_delay(Duration::from_millis(cfg.initial_delay_ms))
            .with_max_delay(Duration::from_millis(cfg.max_delay_ms))
            .with_jitter_factor(cfg.jitter_factor)
            .with_max_exception_chain(cfg.max_exception_chain)
    }

    pub fn build(self) -> Result<RetryPolicy<T, E, C>, ConfigError> {
        let backoff = BackoffConfig::new(
            self.initial_retries,
            self.initial_delay,
            self.max_delay,
            self.jitter_factor,
        )?;
        Ok(RetryPolicy {
            partials: self.partials,
            backoff,
            delay_key: self.delay_key,
            max_exception_chain: self.max_exception_chain,
        })
    }
}

impl<T, E, C> RetryPolicyBuilder<T, E, C>
where
    T: 'static,
    E: 'static,
    C: 'static,
{
    /// Register a partial predicate built fresh for every call. This is the
    /// general form the other registration methods reduce to.
    pub fn with_partial_predicate<F, P>(mut self, factory: F) -> Self
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: PartialPredicate<T, E, C> + 'static,
    {
        self.partials.push(Arc::new(move || {
            Box::new(factory()) as Box<dyn PartialPredicate<T, E, C>>
        }));
        self
    }

    /// Categorise outcomes for back-off: each distinct key gets its own
    /// Fibonacci sequence. Without this, categories are the outcome side and
    /// enum variant, so all errors of a struct type share one sequence.
    pub fn with_delay_key<F, K>(mut self, key: F) -> Self
    where
        F: Fn(&Result<T, E>) -> K + Send + Sync + 'static,
        K: Hash + 'static,
    {
        self.delay_key = Some(delay_key_fn(key));
        self
    }

    /// Retry (with back-off) every error `matches` accepts.
    pub fn with_retry_on_error<M>(self, matches: M) -> Self
    where
        M: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.with_error_partial_predicate(move |e, _| matches(e).then(RetryDecision::retry_default))
    }

    /// Like [`with_retry_on_error`](Self::with_retry_on_error), at most `max_retries` times per call.
    pub fn with_retry_on_error_max<M>(self, matches: M, max_retries: u32) -> Self
    where
        M: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.with_error_partial_predicate_max(
            move |e, _| matches(e).then(RetryDecision::retry_default),
            max_retries,
        )
    }

    pub fn with_error_partial_predicate<F>(self, rule: F) -> Self
    where
        F: Fn(&E, &C) -> Option<RetryDecision<T, E, C>> + Send + Sync + 'static,
    {
        let rule = Arc::new(rule);
        self.with_partial_predicate(move || {
            let rule = Arc::clone(&rule);
            OnError(move |e: &E, c: &C| rule(e, c))
        })
    }

    pub fn with_error_partial_predicate_max<F>(self, rule: F, max_retries: u32) -> Self
    where
        F: Fn(&E, &C) -> Option<RetryDecision<T, E, C>> + Send + Sync + 'static,
    {
        let rule = Arc::new(rule);
        self.with_partial_predicate(move || {
            let rule = Arc::clone(&rule);
            CountLimited::new(max_retries, OnError(move |e: &E, c: &C| rule(e, c)))
        })
    }

    /// Error rule with its own mutable state, created fresh per call by `factory`.
    pub fn with_error_stateful_partial_predicate<F, R>(self, factory: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: FnMut(&E, &C) -> Option<RetryDecision<T, E, C>> + 'static,
    {
        self.with_partial_predicate(move || OnError(factory()))
    }

    pub fn with_result_partial_predicate<F>(self, rule: F) -> Self
    where
        F: Fn(&T, &C) -> Option<RetryDecision<T, E, C>> + Send + Sync + 'static,
    {
        let rule = Arc::new(rule);
        self.with_partial_predicate(move || {
            let rule = Arc::clone(&rule);
            OnResult(move |v: &T, c: &C| rule(v, c))
        })
    }

    pub fn with_result_partial_predicate_max<F>(self, rule: F, max_retries: u32) -> Self
    where
        F: Fn(&T, &C) -> Option<RetryDecision<T, E, C>> + Send + Sync + 'static,
    {
        let rule = Arc::new(rule);
        self.with_partial_predicate(move || {
            let rule = Arc::clone(&rule);
            CountLimited::new(max_retries, OnResult(move |v: &T, c: &C| rule(v, c)))
        })
    }

    /// Result rule with its own mutable state, created fresh per call by `factory`.
    pub fn with_result_stateful_partial_predicate<F, R>(self, factory: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: FnMut(&T, &C) -> Option<RetryDecision<T, E, C>> + 'static,
    {
        self.with_partial_predicate(move || OnResult(factory()))
    }
}
