//! Back-off delay suppliers.
//!
//! Suppliers are stateful: each call to [`DelaySupplier::next_delay_nanos`]
//! advances the sequence. A fresh supplier graph is built for every
//! top-level call so sequences never carry over between calls.

mod fibonacci;
mod jitter;
mod keyed;

pub use fibonacci::FibonacciDelay;
pub use jitter::JitteredDelay;
pub use keyed::{
    delay_key_fn, io_error_kind, outcome_key, BackoffConfig, DelayKeyFn, OutcomeKey,
    TypeKeyedDelays,
};

pub(crate) use keyed::duration_nanos;

/// Produces the delay before each successive retry.
pub trait DelaySupplier {
    /// Delay in nanoseconds before the next retry. Never negative.
    fn next_delay_nanos(&mut self) -> i64;
}

impl<S: DelaySupplier + ?Sized> DelaySupplier for Box<S> {
    fn next_delay_nanos(&mut self) -> i64 {
        (**self).next_delay_nanos()
    }
}
