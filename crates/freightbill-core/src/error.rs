use freightbill_domain::DocumentStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Line index {index} out of range (document has {len} lines)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Invalid transition {from} -> {to}: {reason}")]
    InvalidTransition {
        from: DocumentStatus,
        to: DocumentStatus,
        reason: String,
    },
    #[error("Store error: {0}")]
    Store(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        CoreError::Store(message.into())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Store(format!("serialization: {err}"))
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Store(format!("io: {err}"))
    }
}
