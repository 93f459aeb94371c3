//! Fixed-capacity buffer pool with single-owner semantics: a buffer handed
//! out by `give` is owned exclusively by whichever path received it until
//! it flows back through `give_back`.

pub mod error;
pub mod flags;
pub mod pool;

pub use error::{PoolError, Result};
pub use flags::{Owner, SlotState};
pub use pool::BufferPool;
