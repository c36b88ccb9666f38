//! Tests for delays and config.

use super::parse;
use crate::cli::CliCommand;

#[test]
fn cli_parse_delays_default_count() {
    match parse(&["failsafe", "delays"]) {
        CliCommand::Delays { count, backoff } => {
            assert_eq!(count, 10);
            assert!(backoff.jitter.is_none());
        }
        _ => panic!("expected Delays"),
    }
}

#[test]
fn cli_parse_delays_with_backoff() {
    match parse(&[
        "failsafe",
        "delays",
        "--count",
        "5",
        "--initial-retries",
        "1",
        "--jitter",
        "0",
    ]) {
        CliCommand::Delays { count, backoff } => {
            assert_eq!(count, 5);
            assert_eq!(backoff.initial_retries, Some(1));
            assert_eq!(backoff.jitter, Some(0.0));
        }
        _ => panic!("expected Delays"),
    }
}

#[test]
fn cli_parse_config() {
    match parse(&["failsafe", "config"]) {
        CliCommand::Config => {}
        _ => panic!("expected Config"),
    }
}
