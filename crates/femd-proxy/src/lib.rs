//! Per-card UDP proxy: socket ownership, sequence bookkeeping, and the
//! frame-classification dispatch that feeds the FEM array and event builder.

pub mod error;
pub mod proxy;
pub mod socket;

pub use error::{ProxyError, Result};
pub use proxy::{FemProxy, FrameOutcome, DEFAULT_MAX_REQ_CREDIT_BYTES, DEFAULT_REQ_THRESHOLD_BYTES};
pub use socket::{target_for_card, DEFAULT_PORT, MTU, RECV_BUFFER_SIZE};
