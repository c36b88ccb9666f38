//! Back-off sequences keyed by outcome type.
//!
//! Unrelated failure categories (e.g. a timeout and a throttling response)
//! recover on different schedules, so each category gets its own Fibonacci
//! sequence instead of sharing one attempt counter.
//!
//! By default a category is the outcome side plus its enum variant. Struct
//! errors such as `std::io::Error` have a single variant, so callers that
//! need finer categories supply a [`DelayKeyFn`] (see [`io_error_kind`]).

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::io;
use std::mem::{discriminant, Discriminant};
use std::sync::Arc;
use std::time::Duration;

use super::{DelaySupplier, FibonacciDelay, JitteredDelay};
use crate::policy::ConfigError;

/// Classification used to pick a back-off sequence: which side of the
/// outcome (value or error) and which enum variant it is. Non-enum types
/// have a single variant, so e.g. every `std::io::Error` shares one sequence.
pub type OutcomeKey<T, E> = Result<Discriminant<T>, Discriminant<E>>;

pub fn outcome_key<T, E>(outcome: &Result<T, E>) -> OutcomeKey<T, E> {
    match outcome {
        Ok(value) => Ok(discriminant(value)),
        Err(error) => Err(discriminant(error)),
    }
}

/// Caller-supplied category of an outcome, reduced to a hash. Outcomes that
/// hash alike share a back-off sequence.
pub type DelayKeyFn<T, E> = Arc<dyn Fn(&Result<T, E>) -> u64 + Send + Sync>;

/// Wrap a categorising function as a [`DelayKeyFn`].
pub fn delay_key_fn<T, E, K, F>(key: F) -> DelayKeyFn<T, E>
where
    F: Fn(&Result<T, E>) -> K + Send + Sync + 'static,
    K: Hash + 'static,
    T: 'static,
    E: 'static,
{
    Arc::new(move |outcome: &Result<T, E>| {
        let mut hasher = DefaultHasher::new();
        key(outcome).hash(&mut hasher);
        hasher.finish()
    })
}

/// Categorise `io::Error` outcomes by [`io::ErrorKind`]; values share one category.
pub fn io_error_kind<T>(outcome: &Result<T, io::Error>) -> Option<io::ErrorKind> {
    outcome.as_ref().err().map(io::Error::kind)
}

/// Validated back-off parameters shared by every sequence of a policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffConfig {
    initial_retries: u32,
    initial_delay_nanos: i64,
    max_delay_nanos: i64,
    jitter_factor: f64,
}

impl BackoffConfig {
    pub fn new(
        initial_retries: u32,
        initial_delay: Duration,
        max_delay: Duration,
        jitter_factor: f64,
    ) -> Result<Self, ConfigError> {
        super::jitter::validate_jitter_factor(jitter_factor)?;
        if initial_delay > max_delay {
            return Err(ConfigError::DelayRange {
                initial: initial_delay,
                max: max_delay,
            });
        }
        Ok(Self {
            initial_retries,
            initial_delay_nanos: duration_nanos(initial_delay),
            max_delay_nanos: duration_nanos(max_delay),
            jitter_factor,
        })
    }

    pub fn initial_retries(&self) -> u32 {
        self.initial_retries
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_nanos(self.initial_delay_nanos as u64)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_nanos(self.max_delay_nanos as u64)
    }

    pub fn jitter_factor(&self) -> f64 {
        self.jitter_factor
    }

    /// A fresh jittered Fibonacci sequence.
    pub fn supplier(&self) -> JitteredDelay<FibonacciDelay> {
        JitteredDelay::from_validated(
            FibonacciDelay::new(
                self.initial_retries,
                self.initial_delay_nanos,
                self.max_delay_nanos,
            ),
            self.jitter_factor,
        )
    }
}

pub(crate) fn duration_nanos(d: Duration) -> i64 {
    i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)
}

/// One independent back-off sequence per [`OutcomeKey`], refined by the
/// caller's [`DelayKeyFn`] when one is set.
pub struct TypeKeyedDelays<T, E> {
    config: BackoffConfig,
    key: Option<DelayKeyFn<T, E>>,
    sequences: HashMap<(OutcomeKey<T, E>, u64), JitteredDelay<FibonacciDelay>>,
}

impl<T, E> TypeKeyedDelays<T, E> {
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            config,
            key: None,
            sequences: HashMap::new(),
        }
    }

    pub fn keyed_by(mut self, key: DelayKeyFn<T, E>) -> Self {
        self.key = Some(key);
        self
    }

    /// Next delay in the sequence belonging to this outcome's category.
    pub fn next_delay_nanos(&mut self, outcome: &Result<T, E>) -> i64 {
        let config = self.config;
        let refined = self.key.as_ref().map_or(0, |key| key(outcome));
        self.sequences
            .entry((outcome_key(outcome), refined))
            .or_insert_with(|| config.supplier())
            .next_delay_nanos()
    }

    /// Number of categories seen so far.
    pub fn tracked(&self) -> usize {
        self.sequences.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum Failure {
        Timeout,
        Throttled,
    }

    fn config(initial_retries: u32) -> BackoffConfig {
        BackoffConfig::new(
            initial_retries,
            Duration::from_nanos(100),
            Duration::from_nanos(10_000),
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(matches!(
            BackoffConfig::new(0, Duration::from_secs(1), Duration::from_secs(1), 2.0),
            Err(ConfigError::JitterFactor(_))
        ));
        assert!(matches!(
            BackoffConfig::new(0, Duration::from_secs(2), Duration::from_secs(1), 0.1),
            Err(ConfigError::DelayRange { .. })
        ));
    }

    #[test]
    fn each_category_has_its_own_sequence() {
        let mut delays: TypeKeyedDelays<(), Failure> = TypeKeyedDelays::new(config(1));
        let timeout = Err(Failure::Timeout);
        let throttled = Err(Failure::Throttled);

        assert_eq!(delays.next_delay_nanos(&timeout), 0);
        assert_eq!(delays.next_delay_nanos(&timeout), 100);
        assert_eq!(delays.next_delay_nanos(&timeout), 100);
        assert_eq!(delays.next_delay_nanos(&timeout), 200);

        // A new category starts from the beginning of its own sequence.
        assert_eq!(delays.next_delay_nanos(&throttled), 0);
        assert_eq!(delays.next_delay_nanos(&throttled), 100);

        // And the first category picks up where it left off.
        assert_eq!(delays.next_delay_nanos(&timeout), 300);
        assert_eq!(delays.tracked(), 2);
    }

    #[test]
    fn values_and_errors_are_separate_categories() {
        let mut delays: TypeKeyedDelays<i32, Failure> = TypeKeyedDelays::new(config(0));
        assert_eq!(delays.next_delay_nanos(&Ok(-1)), 100);
        assert_eq!(delays.next_delay_nanos(&Err(Failure::Timeout)), 100);
        assert_eq!(delays.next_delay_nanos(&Ok(-2)), 100);
        assert_eq!(delays.next_delay_nanos(&Ok(-3)), 200);
    }

    #[test]
    fn io_error_kinds_get_separate_sequences() {
        let mut delays: TypeKeyedDelays<(), io::Error> =
            TypeKeyedDelays::new(config(0)).keyed_by(delay_key_fn(io_error_kind));
        let timed_out = || Err(io::Error::from(io::ErrorKind::TimedOut));
        let refused = || Err(io::Error::from(io::ErrorKind::ConnectionRefused));

        assert_eq!(delays.next_delay_nanos(&timed_out()), 100);
        assert_eq!(delays.next_delay_nanos(&timed_out()), 100);
        assert_eq!(delays.next_delay_nanos(&refused()), 100);
        assert_eq!(delays.next_delay_nanos(&timed_out()), 200);
        assert_eq!(delays.tracked(), 2);
    }

    #[test]
    fn io_errors_share_a_sequence_without_a_key() {
        let mut delays: TypeKeyedDelays<(), io::Error> = TypeKeyedDelays::new(config(0));
        assert_eq!(
            delays.next_delay_nanos(&Err(io::Error::from(io::ErrorKind::TimedOut))),
            100
        );
        assert_eq!(
            delays.next_delay_nanos(&Err(io::Error::from(io::ErrorKind::TimedOut))),
            100
        );
        assert_eq!(
            delays.next_delay_nanos(&Err(io::Error::from(io::ErrorKind::ConnectionRefused))),
            200
        );
        assert_eq!(delays.tracked(), 1);
    }
}
