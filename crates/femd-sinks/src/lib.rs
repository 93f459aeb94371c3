//! Event-builder sink trait and the disk/counters/null implementations
//! that ship with the DAQ core.

pub mod counters;
pub mod disk;
pub mod error;
pub mod naming;
pub mod null;
pub mod sink;

pub use counters::{CountersSink, Snapshot};
pub use disk::{DiskMode, DiskSink};
pub use error::{Result, SinkError};
pub use naming::RunParams;
pub use null::NullSink;
pub use sink::{Sink, SourceId};
