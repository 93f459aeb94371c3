//! Sink that discards everything; used for `--read-only` and benchmarking.

use crate::error::Result;
use crate::sink::{Sink, SourceId};

#[derive(Debug, Default)]
pub struct NullSink;

impl Sink for NullSink {
    fn on_frame(&mut self, _source: SourceId, _payload: &[u8]) -> Result<()> {
        Ok(())
    }
}
