//! Cooperative-stop worker thread wrapper.
//!
//! Rust has no safe thread-kill primitive, so unlike the original's
//! `Kill`, shutdown is always cooperative: `request_stop` flips an atomic
//! flag the worker body is expected to observe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Shared stop flag a worker body polls between units of work.
#[derive(Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A named, joinable worker thread carrying its own [`StopToken`].
pub struct WorkerThread {
    name: String,
    stop: StopToken,
    handle: Option<JoinHandle<()>>,
}

impl WorkerThread {
    /// Spawn `body` on a new OS thread named `name`. `body` receives the
    /// stop token it should poll.
    pub fn spawn<F>(name: impl Into<String>, body: F) -> Self
    where
        F: FnOnce(StopToken) + Send + 'static,
    {
        let name = name.into();
        let stop = StopToken::new();
        let stop_for_body = stop.clone();
        let handle = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || body(stop_for_body))
            .expect("failed to spawn worker thread");
        Self { name, stop, handle: Some(handle) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the worker to stop at its next cooperative check point.
    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    /// Block until the worker thread exits.
    ///
    /// Logs rather than panics on a poisoned join, mirroring the "log and
    /// continue shutdown" posture the fetcher's exit path expects.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!(worker = %self.name, "worker thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn worker_runs_until_stop_requested() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let worker = WorkerThread::spawn("test-worker", move |stop| {
            while !stop.is_stopped() {
                counter_clone.fetch_add(1, AtomicOrdering::SeqCst);
                std::thread::sleep(Duration::from_millis(1));
            }
        });
        std::thread::sleep(Duration::from_millis(20));
        worker.request_stop();
        worker.join();
        assert!(counter.load(AtomicOrdering::SeqCst) > 0);
    }

    #[test]
    fn worker_name_is_preserved() {
        let worker = WorkerThread::spawn("named", |_stop| {});
        assert_eq!(worker.name(), "named");
        worker.join();
    }
}
