use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::*;
use crate::decision::RetryDecision;
use crate::delay::io_error_kind;
use crate::predicate::RetryPredicate;
use crate::retry::AllDeclared;

type Op = Box<dyn FnMut() -> Result<i32, String> + Send>;

fn failing(times: u32, calls: Arc<AtomicU32>) -> Op {
    Box::new(move || {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= times {
            Err(format!("attempt {n}"))
        } else {
            Ok(n as i32)
        }
    })
}

fn quick() -> RetryPolicyBuilder<i32, String, Op> {
    RetryPolicy::builder()
        .with_initial_retries(0)
        .with_initial_delay(Duration::from_millis(1))
        .with_max_delay(Duration::from_millis(2))
        .with_jitter_factor(0.0)
}

#[test]
fn no_rules_means_no_retry() {
    let policy = quick().build().unwrap();
    let calls = Arc::new(AtomicU32::new(0));
    let err = policy
        .call(failing(5, Arc::clone(&calls)), &AllDeclared)
        .unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(err.into_error().as_deref(), Some("attempt 1"));
}

#[test]
fn count_limit_is_per_call() {
    let policy = quick().with_retry_on_error_max(|_| true, 1).build().unwrap();

    for _ in 0..3 {
        let calls = Arc::new(AtomicU32::new(0));
        let value = policy
            .call(failing(1, Arc::clone(&calls)), &AllDeclared)
            .unwrap();
        assert_eq!(value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

#[test]
fn first_registered_rule_wins() {
    let policy = quick()
        .with_error_partial_predicate(|_, _| Some(RetryDecision::abort_with_result(-7)))
        .with_retry_on_error(|_| true)
        .build()
        .unwrap();
    let calls = Arc::new(AtomicU32::new(0));
    let value = policy
        .call(failing(3, Arc::clone(&calls)), &AllDeclared)
        .unwrap();
    assert_eq!(value, -7);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn stateful_rule_starts_fresh_each_call() {
    let policy = quick()
        .with_error_stateful_partial_predicate(|| {
            let mut seen = 0u32;
            move |_: &String, _: &Op| {
                seen += 1;
                (seen <= 2).then(RetryDecision::retry_default)
            }
        })
        .build()
        .unwrap();

    for _ in 0..2 {
        let calls = Arc::new(AtomicU32::new(0));
        let err = policy
            .call(failing(10, Arc::clone(&calls)), &AllDeclared)
            .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(err.failure().map(|f| f.suppressed().len()), Some(2));
    }
}

#[test]
fn shared_across_threads() {
    let policy = quick().with_retry_on_error_max(|_| true, 3).build().unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let policy = policy.clone();
            thread::spawn(move || {
                let calls = Arc::new(AtomicU32::new(0));
                policy.call(failing(2, calls), &AllDeclared)
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 3);
    }
}

#[test]
fn interrupted_before_first_attempt() {
    let policy = quick().with_retry_on_error(|_| true).build().unwrap();
    let interrupt = Interrupt::new();
    interrupt.interrupt();
    let calls = Arc::new(AtomicU32::new(0));
    let err = policy
        .call_interruptible(failing(1, Arc::clone(&calls)), &AllDeclared, &interrupt)
        .unwrap_err();
    assert!(err.is_interrupted());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn delay_key_reaches_fresh_predicates() {
    type IoOp = fn() -> Result<i32, io::Error>;
    let policy: RetryPolicy<i32, io::Error, IoOp> = RetryPolicy::builder()
        .with_retry_on_error(|_| true)
        .with_initial_retries(0)
        .with_initial_delay(Duration::from_millis(1))
        .with_max_delay(Duration::from_secs(1))
        .with_jitter_factor(0.0)
        .with_delay_key(io_error_kind)
        .build()
        .unwrap();
    let op: IoOp = || Ok(0);
    let mut predicate = policy.new_predicate();
    let mut delay = |kind: io::ErrorKind| {
        predicate
            .decide(&Err(io::Error::from(kind)), &op)
            .delay_nanos()
    };

    assert_eq!(delay(io::ErrorKind::TimedOut), Some(1_000_000));
    assert_eq!(delay(io::ErrorKind::TimedOut), Some(1_000_000));
    assert_eq!(delay(io::ErrorKind::ConnectionRefused), Some(1_000_000));
    assert_eq!(delay(io::ErrorKind::TimedOut), Some(2_000_000));
}
