//! Interruption: a shared token that stops a retrying call.
//!
//! The executor loop checks the token before the first attempt and before
//! every back-off sleep, and sleeps on it so that setting the token wakes a
//! sleeping call immediately instead of waiting out the delay.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Error returned when a call was stopped through its [`Interrupt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

impl std::fmt::Display for Interrupted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "call interrupted")
    }
}

impl std::error::Error for Interrupted {}

#[derive(Debug, Default)]
struct Signal {
    set: Mutex<bool>,
    wake: Condvar,
}

/// Cloneable cancellation token. All clones share one flag.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    signal: Arc<Signal>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        // A poisoned flag is still a valid bool.
        self.signal.set.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Request interruption and wake any sleeper.
    pub fn interrupt(&self) {
        *self.flag() = true;
        self.signal.wake.notify_all();
    }

    pub fn is_interrupted(&self) -> bool {
        *self.flag()
    }

    /// Clear the flag so the token can be reused.
    pub fn reset(&self) {
        *self.flag() = false;
    }

    /// Fail fast if the flag is set.
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_interrupted() {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }

    /// Sleep for `duration`, returning early with `Interrupted` once the flag is set.
    pub fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        let deadline = Instant::now() + duration;
        let mut set = self.flag();
        loop {
            if *set {
                return Err(Interrupted);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            set = self
                .signal
                .wake
                .wait_timeout(set, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|e| e.into_inner().0);
        }
    }
}
