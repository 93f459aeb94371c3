use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("source {0} input queue is full; receiver must stop rather than overrun")]
    QueueFull(u8),

    #[error(transparent)]
    Codec(#[from] femd_codec::CodecError),

    #[error(transparent)]
    Sink(#[from] femd_sinks::SinkError),
}

pub type Result<T> = std::result::Result<T, BuilderError>;
