use thiserror::Error;

/// Content API client errors
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    /// Transport failure before a response was received
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// The API answered with a non-success status
    #[error("Content API operation '{operation}' failed ({status}): {message}")]
    RequestFailed {
        operation: String,
        status: u16,
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("Invalid response format: expected {expected}, got {got}")]
    InvalidResponse { expected: String, got: String },

    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    /// The HTTP client could not be constructed
    #[error("Client configuration error: {message}")]
    ConfigurationError { message: String },
}

impl ClientError {
    /// Build a `RequestFailed` from a status code and the raw error body
    pub fn request_failed(operation: &str, status: u16, body: impl Into<String>) -> Self {
        ClientError::RequestFailed {
            operation: operation.to_string(),
            status,
            message: body.into(),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::SerializationError {
            message: err.to_string(),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_display() {
        let err = ClientError::request_failed("query", 401, "Unauthorized");
        assert_eq!(
            err.to_string(),
            "Content API operation 'query' failed (401): Unauthorized"
        );
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ClientError = parse_err.into();
        assert!(matches!(err, ClientError::SerializationError { .. }));
    }
}
