use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArrayError {
    #[error("command already pending on card {0}")]
    CommandAlreadyPending(u8),

    #[error("card index {0} is out of range")]
    CardOutOfRange(u8),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Pool(#[from] femd_buffer::PoolError),

    #[error(transparent)]
    Proxy(#[from] femd_proxy::ProxyError),
}

pub type Result<T> = std::result::Result<T, ArrayError>;
