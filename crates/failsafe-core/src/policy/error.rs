//! Configuration errors, raised when a policy is built.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid jitter factor {0}: must be within [0, 1]")]
    JitterFactor(f64),

    #[error("initial delay {initial:?} exceeds max delay {max:?}")]
    DelayRange { initial: Duration, max: Duration },
}
