//! Multi-source event builder: per-source input queues, transparent or
//! active (cross-source) assembly, and the output recycle ring.

pub mod builder;
pub mod error;
pub mod mode;
pub mod queues;

pub use builder::EventBuilder;
pub use error::{BuilderError, Result};
pub use mode::EbMode;
pub use queues::{EventQueues, InputItem, RecycleItem, INPUT_RING_DEPTH, MAX_SOURCES};
