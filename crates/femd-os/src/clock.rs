//! Monotonic time source abstraction, real and fake.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Nanosecond monotonic clock, abstracted so tests can drive time without
/// real sleeps.
pub trait Clock: Send + Sync {
    fn now_ns(&self) -> u64;
}

/// Real monotonic clock backed by `std::time::Instant`.
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }
}

/// Test double: an explicit nanosecond counter, advanced manually.
pub struct FakeClock {
    now_ns: AtomicU64,
}

impl FakeClock {
    pub fn new(start_ns: u64) -> Self {
        Self { now_ns: AtomicU64::new(start_ns) }
    }

    pub fn set_ns(&self, ns: u64) {
        self.now_ns.store(ns, Ordering::SeqCst);
    }

    pub fn advance_ns(&self, delta_ns: u64) {
        self.now_ns.fetch_add(delta_ns, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_ns(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_clock_advances_and_sets() {
        let clock = FakeClock::new(0);
        assert_eq!(clock.now_ns(), 0);
        clock.advance_ns(100);
        assert_eq!(clock.now_ns(), 100);
        clock.set_ns(5);
        assert_eq!(clock.now_ns(), 5);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ns();
        let b = clock.now_ns();
        assert!(b >= a);
    }
}
