use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaturityError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for MaturityError {
    fn from(e: serde_json::Error) -> Self {
        MaturityError::SerializationError(e.to_string())
    }
}
