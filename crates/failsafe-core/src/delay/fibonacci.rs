//! Fibonacci back-off with an initial no-delay window and a cap.

use super::DelaySupplier;

/// Delays: `0` for the first `initial_retries` calls, then
/// `start, start, 2*start, 3*start, 5*start, ...` capped at `max`.
#[derive(Debug, Clone)]
pub struct FibonacciDelay {
    immediate_left: u32,
    prev: i64,
    next: i64,
    max: i64,
}

impl FibonacciDelay {
    /// Negative inputs are treated as zero; `max` below `start` caps at `max`.
    pub fn new(initial_retries: u32, start_nanos: i64, max_nanos: i64) -> Self {
        let start = start_nanos.max(0);
        Self {
            immediate_left: initial_retries,
            prev: 0,
            next: start,
            max: max_nanos.max(0),
        }
    }
}

impl DelaySupplier for FibonacciDelay {
    fn next_delay_nanos(&mut self) -> i64 {
        if self.immediate_left > 0 {
            self.immediate_left -= 1;
            return 0;
        }
        if self.next >= self.max {
            return self.max;
        }
        let current = self.next;
        self.next = self.prev.saturating_add(current);
        self.prev = current;
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take(s: &mut FibonacciDelay, n: usize) -> Vec<i64> {
        (0..n).map(|_| s.next_delay_nanos()).collect()
    }

    #[test]
    fn initial_retries_are_immediate() {
        let mut s = FibonacciDelay::new(3, 10, 1_000);
        assert_eq!(take(&mut s, 3), vec![0, 0, 0]);
        assert_eq!(s.next_delay_nanos(), 10);
    }

    #[test]
    fn follows_fibonacci_growth() {
        let mut s = FibonacciDelay::new(0, 10, 1_000);
        assert_eq!(take(&mut s, 7), vec![10, 10, 20, 30, 50, 80, 130]);
    }

    #[test]
    fn capped_sequence_stays_capped() {
        let mut s = FibonacciDelay::new(1, 1, 7);
        let delays = take(&mut s, 20);
        assert_eq!(delays[0], 0);
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
        assert!(delays.iter().all(|d| *d <= 7));
        let first_cap = delays.iter().position(|d| *d == 7).unwrap();
        assert!(delays[first_cap..].iter().all(|d| *d == 7));
    }

    #[test]
    fn start_above_max_is_capped() {
        let mut s = FibonacciDelay::new(0, 100, 40);
        assert_eq!(take(&mut s, 3), vec![40, 40, 40]);
    }

    #[test]
    fn zero_start_stays_zero() {
        let mut s = FibonacciDelay::new(0, 0, 40);
        assert_eq!(take(&mut s, 4), vec![0, 0, 0, 0]);
    }

    #[test]
    fn large_values_do_not_overflow() {
        let mut s = FibonacciDelay::new(0, i64::MAX / 2, i64::MAX);
        let delays = take(&mut s, 10);
        assert!(delays.iter().all(|d| *d >= 0));
        assert_eq!(*delays.last().unwrap(), i64::MAX);
    }
}
