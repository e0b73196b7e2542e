use thiserror::Error;

use crate::storage::BlobError;

/// Fallback message for 5xx responses whose error carries no text.
pub const GENERIC_ERROR_MESSAGE: &str = "internal server error";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unexpected(String),
}

impl ServiceError {
    pub fn missing_id() -> Self { Self::BadRequest("Missing UUID".into()) }

    pub fn user_not_found() -> Self { Self::NotFound("user not found".into()) }

    /// HTTP status code this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::Unexpected(_) => 500,
        }
    }

    /// Message placed in the `{"error": ...}` response body.
    pub fn public_message(&self) -> String {
        match self {
            Self::BadRequest(msg) | Self::NotFound(msg) => msg.clone(),
            Self::Unexpected(msg) if msg.trim().is_empty() => GENERIC_ERROR_MESSAGE.to_string(),
            Self::Unexpected(msg) => msg.clone(),
        }
    }
}

impl From<BlobError> for ServiceError {
    fn from(e: BlobError) -> Self { Self::Unexpected(e.to_string()) }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self { Self::Unexpected(format!("serialization error: {e}")) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(ServiceError::missing_id().status_code(), 400);
        assert_eq!(ServiceError::user_not_found().status_code(), 404);
        assert_eq!(ServiceError::Unexpected("boom".into()).status_code(), 500);
    }

    #[test]
    fn blank_unexpected_message_degrades_to_generic() {
        let err = ServiceError::Unexpected("   ".into());
        assert_eq!(err.public_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn blob_errors_become_unexpected() {
        let err: ServiceError = BlobError::Backend("connection reset".into()).into();
        assert!(matches!(err, ServiceError::Unexpected(ref m) if m.contains("connection reset")));
    }
}
