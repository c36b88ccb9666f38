//! Synchronous retry execution.
//!
//! This module owns the executor loop (run an operation, consult the
//! predicate, sleep, repeat), the bounded error chain that documents a retry
//! run, and the classification that decides how the final error is raised.

mod chain;
mod classify;
mod error;
mod run;

pub use chain::ErrorChain;
pub use classify::{classify_io_error, AllDeclared, Classify, ErrorClass};
pub use error::{Failure, RetryError};
pub use run::{run_with_retry, DEFAULT_MAX_EXCEPTION_CHAIN};
