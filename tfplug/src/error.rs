//! Error types for tfplug

/// Errors raised while navigating values or running callbacks
#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("attribute '{0}' not found")]
    AttributeNotFound(String),

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, TfplugError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = TfplugError::TypeMismatch {
            expected: "string".to_string(),
            actual: "bool".to_string(),
        };
        assert_eq!(err.to_string(), "Type mismatch: expected string, got bool");
        assert_eq!(
            TfplugError::AttributeNotFound("name".to_string()).to_string(),
            "attribute 'name' not found"
        );
    }
}
