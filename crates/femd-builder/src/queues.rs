//! Per-source input rings and the flat output recycle ring.

use crossbeam_channel::{bounded, Receiver, Sender};

/// Matches the card-id field width (5 bits) in the frame header.
pub const MAX_SOURCES: usize = 32;

/// Per-source ring depth, chosen per `spec.md` so a source cannot overrun
/// it before the builder drains, given `MAX_REQ_CREDIT_BYTES`.
pub const INPUT_RING_DEPTH: usize = 256;

/// One buffer queued for assembly: its source, the pool address it came
/// from (opaque to this crate), and the frame bytes to decode.
#[derive(Debug, Clone)]
pub struct InputItem {
    pub source: u8,
    pub addr: usize,
    pub bytes: Vec<u8>,
}

/// A released buffer flowing back to the FEM array for recycling to the pool.
#[derive(Debug, Clone, Copy)]
pub struct RecycleItem {
    pub addr: usize,
    pub source: u8,
    pub declared_len: u16,
}

/// Owns the bounded per-source input channels and the single output
/// recycle channel.
pub struct EventQueues {
    q_in_tx: Vec<Sender<InputItem>>,
    q_in_rx: Vec<Receiver<InputItem>>,
    q_out_tx: Sender<RecycleItem>,
    q_out_rx: Receiver<RecycleItem>,
}

impl EventQueues {
    pub fn new(source_count: usize) -> Self {
        assert!(source_count <= MAX_SOURCES);
        let mut q_in_tx = Vec::with_capacity(source_count);
        let mut q_in_rx = Vec::with_capacity(source_count);
        for _ in 0..source_count {
            let (tx, rx) = bounded(INPUT_RING_DEPTH);
            q_in_tx.push(tx);
            q_in_rx.push(rx);
        }
        let (q_out_tx, q_out_rx) = bounded(INPUT_RING_DEPTH * MAX_SOURCES);
        Self { q_in_tx, q_in_rx, q_out_tx, q_out_rx }
    }

    pub fn source_count(&self) -> usize {
        self.q_in_tx.len()
    }

    /// Post a received buffer onto its source's input ring. A full ring is
    /// an invariant violation per `spec.md` §5 ("Backpressure"), surfaced
    /// rather than silently dropped.
    pub fn try_post(&self, item: InputItem) -> Result<(), InputItem> {
        let src = item.source as usize;
        self.q_in_tx[src].try_send(item).map_err(|e| e.into_inner())
    }

    pub fn try_recv(&self, source: u8) -> Option<InputItem> {
        self.q_in_rx[source as usize].try_recv().ok()
    }

    pub fn is_empty(&self, source: u8) -> bool {
        self.q_in_rx[source as usize].is_empty()
    }

    pub fn recycle(&self, item: RecycleItem) {
        let _ = self.q_out_tx.send(item);
    }

    pub fn try_recv_recycled(&self) -> Option<RecycleItem> {
        self.q_out_rx.try_recv().ok()
    }

    /// Drain every source's input ring, returning the drained items for
    /// the caller to return to the pool.
    pub fn flush_all(&self) -> Vec<InputItem> {
        let mut drained = Vec::new();
        for rx in &self.q_in_rx {
            while let Ok(item) = rx.try_recv() {
                drained.push(item);
            }
        }
        drained
    }
}
