use thiserror::Error;

/// Fixed public message for unexpected failures. The real error is only
/// written to the operational log.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Request-path errors mapped to fixed HTTP statuses.
///
/// The three named kinds are raised deliberately by validation code;
/// everything else is wrapped into `Internal` at the handler boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// The HTTP status this error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Internal(_) => 500,
        }
    }

    /// The message returned to the caller.
    ///
    /// Internal failures get the fixed generic message; the underlying
    /// cause never leaves the log.
    pub fn public_message(&self) -> &str {
        match self {
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => msg,
            ApiError::Internal(_) => GENERIC_ERROR_MESSAGE,
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<SecretError> for ApiError {
    fn from(e: SecretError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

/// Errors from message store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),
}

impl From<SecretError> for RepositoryError {
    fn from(e: SecretError) -> Self {
        // Credential retrieval is part of connection establishment.
        RepositoryError::Connection(e.to_string())
    }
}

/// Errors from credential retrieval.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret not found")]
    NotFound,

    #[error("secret fetch error: {0}")]
    Fetch(String),

    #[error("malformed secret payload: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(ApiError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), 404);
        assert_eq!(ApiError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_internal_message_is_generic() {
        let err = ApiError::Internal("connection refused to 10.0.10.4".into());
        assert_eq!(err.public_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_named_errors_expose_their_message() {
        let err = ApiError::Forbidden("message content is required".into());
        assert_eq!(err.public_message(), "message content is required");
    }

    #[test]
    fn test_repository_error_wraps_to_internal() {
        let err: ApiError = RepositoryError::Query("syntax error".into()).into();
        assert_eq!(err.status_code(), 500);
    }
}
