//! Input validation for the two message endpoints.
//!
//! Validation failures raise the named error kinds: a missing identity is
//! `Unauthorized`, malformed input is `Forbidden`. A body that is not JSON
//! at all is an `Internal` failure, matching the generic-500 contract for
//! parse errors.

use postbox_types::error::ApiError;
use postbox_types::message::{MAX_CONTENT_CHARS, NewMessage};

/// Require a non-empty derived user id.
pub fn require_user_id(user_id: Option<String>) -> Result<String, ApiError> {
    match user_id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(ApiError::Unauthorized(
            "user identity could not be resolved".to_string(),
        )),
    }
}

/// Validate the optional `id` query parameter of GET /messages.
///
/// Absent is fine; present means "must parse as a positive integer".
pub fn message_id(raw: Option<&str>) -> Result<Option<u64>, ApiError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.parse::<u64>() {
        Ok(id) if id > 0 => Ok(Some(id)),
        _ => Err(ApiError::Forbidden("invalid message id".to_string())),
    }
}

/// Validate the POST /messages body and produce the insert payload.
pub fn new_message(body: Option<&str>, user_id: String) -> Result<NewMessage, ApiError> {
    let Some(body) = body.filter(|b| !b.is_empty()) else {
        return Err(ApiError::Forbidden("request body is required".to_string()));
    };
    let body: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ApiError::Internal(format!("body parse error: {e}")))?;
    let content = match body.get("content") {
        None | Some(serde_json::Value::Null) => {
            return Err(ApiError::Forbidden(
                "message content is required".to_string(),
            ));
        }
        Some(serde_json::Value::String(s)) => s,
        Some(_) => {
            return Err(ApiError::Forbidden(
                "message content must be a string".to_string(),
            ));
        }
    };
    if content.is_empty() {
        return Err(ApiError::Forbidden(
            "message content is required".to_string(),
        ));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(ApiError::Forbidden(format!(
            "message content must be at most {MAX_CONTENT_CHARS} characters"
        )));
    }
    Ok(NewMessage {
        content: content.clone(),
        user_id,
    })
}
