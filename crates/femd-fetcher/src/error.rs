use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetcherError {
    #[error("unbalanced NEXT with no open LOOP at line {0}")]
    UnbalancedNext(usize),

    #[error("malformed LOOP directive: {0:?}")]
    MalformedLoop(String),

    #[error("malformed fem selector: {0:?}")]
    MalformedFemSelector(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FetcherError>;
