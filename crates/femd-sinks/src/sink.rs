//! The event builder's downstream contract: every forwarded buffer and
//! built-event boundary flows through one or more `Sink`s.

use crate::error::Result;

/// Index of the data source (card) a frame came from.
pub type SourceId = u8;

/// A destination for decoded frame payloads and built-event boundaries.
///
/// Non-blocking from the builder's perspective: a sink that needs to do
/// slow I/O is expected to buffer internally rather than stall the
/// builder thread.
pub trait Sink: Send {
    /// `payload` excludes the leading 16-bit length prefix.
    fn on_frame(&mut self, source: SourceId, payload: &[u8]) -> Result<()>;
    fn on_built_event_start(&mut self) -> Result<()> {
        Ok(())
    }
    fn on_built_event_end(&mut self) -> Result<()> {
        Ok(())
    }
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

// ROOT event-tree append (`timestamp`, `signal_ids`, `signal_values` as a
// flat concatenation of 512-word waveforms) and POSIX shared-memory fan-out
// guarded by a counting semaphore are external collaborators against this
// trait; neither is implemented here.
