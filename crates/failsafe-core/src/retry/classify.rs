//! Classify operation errors for propagation.
//!
//! Rust has no runtime "is this exception assignable to X" check, so callers
//! supply an explicit classification of their error type instead. It must be
//! pure and total.

use std::io;

/// How a final error is raised, and whether it stops the loop outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Programming or runtime failure; raised as-is.
    Unchecked,
    /// A timeout; always raised as-is.
    Timeout,
    /// The error type the caller expects to handle; raised as such.
    Declared,
    /// Anything else; wrapped in a generic execution failure.
    Undeclared,
    /// The operation observed an interruption. Never retried or chained.
    Interrupted,
}

/// Pure, total classification of an operation's error type.
pub trait Classify<E> {
    fn classify(&self, error: &E) -> ErrorClass;
}

impl<E, F> Classify<E> for F
where
    F: Fn(&E) -> ErrorClass,
{
    fn classify(&self, error: &E) -> ErrorClass {
        self(error)
    }
}

/// Treats every error as the declared type.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllDeclared;

impl<E> Classify<E> for AllDeclared {
    fn classify(&self, _error: &E) -> ErrorClass {
        ErrorClass::Declared
    }
}

/// Classification for `std::io::Error`.
pub fn classify_io_error(e: &io::Error) -> ErrorClass {
    match e.kind() {
        io::ErrorKind::TimedOut => ErrorClass::Timeout,
        io::ErrorKind::Interrupted => ErrorClass::Interrupted,
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::Unsupported => {
            ErrorClass::Unchecked
        }
        _ => ErrorClass::Declared,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_timeouts_and_interrupts() {
        assert_eq!(
            classify_io_error(&io::Error::from(io::ErrorKind::TimedOut)),
            ErrorClass::Timeout
        );
        assert_eq!(
            classify_io_error(&io::Error::from(io::ErrorKind::Interrupted)),
            ErrorClass::Interrupted
        );
    }

    #[test]
    fn io_invalid_input_is_unchecked() {
        assert_eq!(
            classify_io_error(&io::Error::from(io::ErrorKind::InvalidInput)),
            ErrorClass::Unchecked
        );
    }

    #[test]
    fn io_other_is_declared() {
        assert_eq!(
            classify_io_error(&io::Error::other("disk")),
            ErrorClass::Declared
        );
        assert_eq!(
            classify_io_error(&io::Error::from(io::ErrorKind::ConnectionReset)),
            ErrorClass::Declared
        );
    }

    #[test]
    fn closures_classify() {
        let by_sign = |v: &i32| {
            if *v < 0 {
                ErrorClass::Undeclared
            } else {
                ErrorClass::Declared
            }
        };
        assert_eq!(by_sign.classify(&-1), ErrorClass::Undeclared);
        assert_eq!(AllDeclared.classify(&-1), ErrorClass::Declared);
    }
}
