//! The result envelope every handler returns.
//!
//! Fixed response shape: status, JSON body, CORS headers. The allow-origin
//! value is computed from the configured allow-list: `*` wins outright,
//! otherwise the request origin is echoed back only when listed, otherwise
//! the header is emitted empty.

use lambda_http::Body;
use lambda_http::http::{Response, StatusCode, header};
use serde::Serialize;

use postbox_types::error::ApiError;

/// Status, body, and allow-origin of one handler response.
#[derive(Debug)]
pub struct Envelope {
    pub status: u16,
    pub body: String,
    pub allow_origin: String,
}

impl Envelope {
    /// A 200 response with the JSON serialization of `payload`.
    pub fn ok<T: Serialize>(payload: &T, allow_origin: String) -> Self {
        match serde_json::to_string(payload) {
            Ok(body) => Self {
                status: 200,
                body,
                allow_origin,
            },
            Err(e) => Self::error(
                &ApiError::Internal(format!("response serialization failed: {e}")),
                allow_origin,
            ),
        }
    }

    /// An error response carrying only the public message.
    pub fn error(error: &ApiError, allow_origin: String) -> Self {
        let body = serde_json::json!({ "message": error.public_message() });
        Self {
            status: error.status_code(),
            body: body.to_string(),
            allow_origin,
        }
    }

    /// Convert into the proxy response shape.
    pub fn into_response(self) -> Response<Body> {
        Response::builder()
            .status(self.status)
            .header(header::CONTENT_TYPE, "application/json")
            .header("Access-Control-Allow-Origin", self.allow_origin.as_str())
            .header("Access-Control-Allow-Methods", "*")
            .header("Access-Control-Allow-Headers", "*")
            .header("Access-Control-Expose-Headers", "*")
            .body(Body::Text(self.body))
            .unwrap_or_else(|_| {
                let mut fallback = Response::new(Body::Text(
                    serde_json::json!({ "message": postbox_types::error::GENERIC_ERROR_MESSAGE })
                        .to_string(),
                ));
                *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

/// Resolve the `Access-Control-Allow-Origin` value for a request.
pub fn resolve_allow_origin(origin: Option<&str>, allow_origins: &[String]) -> String {
    if allow_origins.iter().any(|o| o == "*") {
        return "*".to_string();
    }
    match origin {
        Some(origin) if allow_origins.iter().any(|o| o == origin) => origin.to_string(),
        _ => String::new(),
    }
}
