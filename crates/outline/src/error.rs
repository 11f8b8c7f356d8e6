use thiserror::Error;

/// Result type for outline operations
pub type Result<T> = std::result::Result<T, OutlineError>;

/// Errors that can occur while reconstructing an outline
#[derive(Error, Debug)]
pub enum OutlineError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configured cleanup pattern failed to compile
    #[error("Invalid strip pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Markup could not be analysed or rewritten
    #[error("Markup error: {0}")]
    Markup(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl OutlineError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a markup error
    pub fn markup(msg: impl Into<String>) -> Self {
        Self::Markup(msg.into())
    }
}
