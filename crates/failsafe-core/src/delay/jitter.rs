//! Random jitter around a base delay.

use rand::Rng;

use super::DelaySupplier;
use crate::policy::ConfigError;

/// Wraps a supplier: `delay = base ± uniform(0, base * factor)`, never negative.
#[derive(Debug, Clone)]
pub struct JitteredDelay<S> {
    inner: S,
    factor: f64,
}

impl<S: DelaySupplier> JitteredDelay<S> {
    /// `factor` must lie in `[0, 1]`.
    pub fn new(inner: S, factor: f64) -> Result<Self, ConfigError> {
        validate_jitter_factor(factor)?;
        Ok(Self { inner, factor })
    }

    /// Caller has already validated `factor`.
    pub(super) fn from_validated(inner: S, factor: f64) -> Self {
        Self { inner, factor }
    }
}

pub(crate) fn validate_jitter_factor(factor: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&factor) {
        Ok(())
    } else {
        Err(ConfigError::JitterFactor(factor))
    }
}

impl<S: DelaySupplier> DelaySupplier for JitteredDelay<S> {
    fn next_delay_nanos(&mut self) -> i64 {
        let base = self.inner.next_delay_nanos();
        if base <= 0 || self.factor == 0.0 {
            return base.max(0);
        }
        let spread = base as f64 * self.factor;
        let delta = rand::thread_rng().gen_range(-spread..=spread);
        let low = (base as f64 - spread).floor();
        let high = (base as f64 + spread).ceil();
        // Float to int casts saturate, so the cap at i64::MAX holds.
        ((base as f64 + delta).round().clamp(low, high) as i64).max(0)
    }
}
