//! `failsafe delays` – preview the back-off sequence for the current settings.

use anyhow::Result;
use failsafe_core::config::RetryConfig;
use failsafe_core::delay::{BackoffConfig, DelaySupplier};
use std::time::Duration;

pub(crate) fn backoff_from(retry: &RetryConfig) -> Result<BackoffConfig> {
    Ok(BackoffConfig::new(
        retry.initial_retries,
        Duration::from_millis(retry.initial_delay_ms),
        Duration::from_millis(retry.max_delay_ms),
        retry.jitter_factor,
    )?)
}

/// Sample `count` delays from a fresh supplier.
pub(crate) fn sample_delays(backoff: &BackoffConfig, count: usize) -> Vec<Duration> {
    let mut supplier = backoff.supplier();
    (0..count)
        .map(|_| Duration::from_nanos(supplier.next_delay_nanos().max(0) as u64))
        .collect()
}

pub fn run_delays(retry: &RetryConfig, count: usize) -> Result<()> {
    let backoff = backoff_from(retry)?;
    println!("  {:>5}  {:>12}", "Retry", "Delay");
    println!("  {}  {}", "-----", "------------");
    for (i, delay) in sample_delays(&backoff, count).iter().enumerate() {
        println!("  {:>5}  {:>12}", i + 1, format!("{:?}", delay));
    }
    if backoff.jitter_factor() > 0.0 {
        println!("(jitter ±{:.0}%, values vary per run)", backoff.jitter_factor() * 100.0);
    }
    Ok(())
}
