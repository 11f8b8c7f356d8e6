use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchedulerError>;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Terminal failure of a task after its attempts ran out
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("task failed after {attempts} attempt(s): {message}")]
pub struct TaskFailure {
    /// Attempts made, first try included
    pub attempts: u32,

    /// Error reported by the last attempt
    pub message: String,
}
