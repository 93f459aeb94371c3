use thiserror::Error;

/// Errors raised while decoding the tagged 16-bit word stream.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CodecError {
    #[error("frame too short: need at least {need} bytes, have {have}")]
    TooShort { need: usize, have: usize },

    #[error("declared length {declared} is shorter than the minimum {minimum} bytes required for this frame kind")]
    BelowMinimumForKind { declared: usize, minimum: usize },

    #[error("read {read} bytes but declared frame size is {declared} bytes (under-run)")]
    SizeMismatch { read: usize, declared: usize },

    #[error("word stream ended mid-item while decoding a multi-word prefix")]
    TruncatedItem,

    #[error("odd number of bytes in frame body ({0})")]
    OddLength(usize),

    #[error("not a recognised frame-start prefix")]
    NotAFrameStart,
}

pub type Result<T> = std::result::Result<T, CodecError>;
