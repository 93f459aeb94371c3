//! Counting semaphore with a timed wait that reports timeout separately
//! from error, unlike the conflated Windows wait path in the original.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Outcome of a [`Semaphore::wait_timeout`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitResult {
    Ok,
    Timeout,
    Error,
}

/// A counting semaphore built on `Mutex` + `Condvar`.
///
/// `signal` increments the count and wakes one waiter; `wait`/`wait_timeout`
/// block while the count is zero.
pub struct Semaphore {
    count: Mutex<u64>,
    cv: Condvar,
}

impl Semaphore {
    pub fn new(initial: u64) -> Self {
        Self { count: Mutex::new(initial), cv: Condvar::new() }
    }

    /// Increment the count and wake one waiter.
    pub fn signal(&self) {
        let mut count = match self.count.lock() {
            Ok(g) => g,
            Err(_) => return,
        };
        *count += 1;
        self.cv.notify_one();
    }

    /// Block until the count is positive, then decrement it.
    pub fn wait(&self) -> WaitResult {
        let guard = match self.count.lock() {
            Ok(g) => g,
            Err(_) => return WaitResult::Error,
        };
        let mut guard = match self.cv.wait_while(guard, |c| *c == 0) {
            Ok(g) => g,
            Err(_) => return WaitResult::Error,
        };
        *guard -= 1;
        WaitResult::Ok
    }

    /// Block until the count is positive or `timeout` elapses.
    pub fn wait_timeout(&self, timeout: Duration) -> WaitResult {
        let guard = match self.count.lock() {
            Ok(g) => g,
            Err(_) => return WaitResult::Error,
        };
        let deadline = Instant::now() + timeout;
        let mut guard = guard;
        loop {
            if *guard > 0 {
                *guard -= 1;
                return WaitResult::Ok;
            }
            let now = Instant::now();
            if now >= deadline {
                return WaitResult::Timeout;
            }
            let (next_guard, wait_result) = match self.cv.wait_timeout(guard, deadline - now) {
                Ok(pair) => pair,
                Err(_) => return WaitResult::Error,
            };
            guard = next_guard;
            if wait_result.timed_out() && *guard == 0 {
                return WaitResult::Timeout;
            }
        }
    }

    /// Current count, for diagnostics and tests only.
    pub fn count(&self) -> u64 {
        self.count.lock().map(|g| *g).unwrap_or(0)
    }
}
