//! Blocking retry executor with composable, per-call retry predicates.
//!
//! A [`RetryPolicy`] holds an ordered list of partial predicates plus
//! Fibonacci back-off settings. Each call builds a fresh predicate graph,
//! runs the operation, and keeps retrying until a predicate aborts. Earlier
//! failures ride along on the final error as a bounded suppressed chain.
//!
//! ```no_run
//! use std::io;
//! use failsafe_core::delay::io_error_kind;
//! use failsafe_core::{classify_io_error, RetryPolicy};
//!
//! let policy = RetryPolicy::builder()
//!     .with_retry_on_error_max(|e: &io::Error| e.kind() == io::ErrorKind::ConnectionRefused, 2)
//!     .with_delay_key(io_error_kind)
//!     .build()?;
//! let body = policy.call(|| std::fs::read_to_string("/tmp/flaky"), &classify_io_error)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod control;
pub mod decision;
pub mod delay;
pub mod logging;
pub mod operation;
pub mod policy;
pub mod predicate;
pub mod retry;

pub use control::{Interrupt, Interrupted};
pub use decision::RetryDecision;
pub use operation::{deadline_in, Operation, WithDeadline};
pub use policy::{ConfigError, RetryPolicy, RetryPolicyBuilder};
pub use predicate::{NoRetry, PartialPredicate, RetryPredicate};
pub use retry::{classify_io_error, AllDeclared, Classify, ErrorClass, Failure, RetryError};

