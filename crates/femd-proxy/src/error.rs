use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("socket setup failed: {0}")]
    Socket(#[from] std::io::Error),

    #[error("a command is already pending on this proxy")]
    CommandAlreadyPending,

    #[error(transparent)]
    Codec(#[from] femd_codec::CodecError),

    #[error(transparent)]
    Pool(#[from] femd_buffer::PoolError),
}

pub type Result<T> = std::result::Result<T, ProxyError>;
