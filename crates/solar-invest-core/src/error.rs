use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolarInvestError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for SolarInvestError {
    fn from(e: serde_json::Error) -> Self {
        SolarInvestError::SerializationError(e.to_string())
    }
}
