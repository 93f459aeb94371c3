//! Tracks run-level throughput counters: event id, speed, free disk space.

use crate::error::Result;
use crate::sink::{Sink, SourceId};
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default)]
pub struct Snapshot {
    pub events: u64,
    pub bytes: u64,
    pub events_per_sec: f64,
    pub mb_per_sec: f64,
}

pub struct CountersSink {
    events: u64,
    bytes: u64,
    started: Instant,
}

impl CountersSink {
    pub fn new() -> Self {
        Self { events: 0, bytes: 0, started: Instant::now() }
    }

    pub fn snapshot(&self) -> Snapshot {
        let elapsed = self.started.elapsed().as_secs_f64().max(1e-9);
        Snapshot {
            events: self.events,
            bytes: self.bytes,
            events_per_sec: self.events as f64 / elapsed,
            mb_per_sec: (self.bytes as f64 / (1024.0 * 1024.0)) / elapsed,
        }
    }
}

impl Default for CountersSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for CountersSink {
    fn on_frame(&mut self, _source: SourceId, payload: &[u8]) -> Result<()> {
        self.bytes += payload.len() as u64;
        Ok(())
    }

    fn on_built_event_end(&mut self) -> Result<()> {
        self.events += 1;
        Ok(())
    }
}
