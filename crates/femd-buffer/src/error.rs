use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum PoolError {
    #[error("no free buffer available")]
    NoFree,

    #[error("free_cnt > 0 but no free slot could be located (pool invariant violation)")]
    FreeBufferNotFound,

    #[error("address {0:#x} is outside the pool's backing range")]
    OutOfRange(usize),

    #[error("address {0:#x} is not aligned to a slot boundary")]
    Misaligned(usize),

    #[error("slot {0} is not busy; refusing to over-release")]
    NotBusy(usize),
}

pub type Result<T> = std::result::Result<T, PoolError>;
