use thiserror::Error;

pub type Result<T> = std::result::Result<T, SummarizeError>;

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transport or rate-limit failure; worth retrying
    #[error("Summarization service error: {0}")]
    Service(String),

    /// The service answered, but not with a summary; never retried
    #[error("Malformed summary response: {0}")]
    MalformedResponse(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SummarizeError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }
}
