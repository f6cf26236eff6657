//! Request context extracted from the API Gateway proxy event.
//!
//! Only the pieces the handlers need: origin, bearer token, the `id`
//! query parameter, and the raw body. The bearer token is held in a
//! [`SecretString`] so the derived `Debug` output used by error logging
//! never contains it.

use lambda_http::RequestExt;
use secrecy::{ExposeSecret, SecretString};

use postbox_core::auth::{USER_ID_CLAIM, bearer_claim};

/// The slice of an incoming request the handlers operate on.
#[derive(Debug)]
pub struct RequestContext {
    /// The `Origin` header, for CORS resolution.
    pub origin: Option<String>,
    /// The raw `Authorization` header value, redacted in `Debug` output.
    authorization: Option<SecretString>,
    /// The `id` query parameter, unparsed.
    pub query_id: Option<String>,
    /// The raw request body, if any.
    pub body: Option<String>,
}

impl RequestContext {
    pub fn new(
        origin: Option<String>,
        authorization: Option<String>,
        query_id: Option<String>,
        body: Option<String>,
    ) -> Self {
        Self {
            origin,
            authorization: authorization.map(SecretString::from),
            query_id,
            body,
        }
    }

    /// Extract the handler-relevant slice of an API Gateway proxy event.
    pub fn from_lambda(request: &lambda_http::Request) -> Self {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let query_id = request
            .query_string_parameters_ref()
            .and_then(|params| params.first("id"))
            .map(str::to_string);
        let body = match request.body() {
            lambda_http::Body::Text(text) => Some(text.clone()),
            lambda_http::Body::Binary(bytes) => String::from_utf8(bytes.clone()).ok(),
            lambda_http::Body::Empty => None,
        };
        Self::new(header("origin"), header("authorization"), query_id, body)
    }

    /// The caller identity from the bearer token's `sub` claim, if any.
    pub fn user_id(&self) -> Option<String> {
        self.authorization
            .as_ref()
            .and_then(|token| bearer_claim(token.expose_secret(), USER_ID_CLAIM))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::token_for;

    #[test]
    fn test_user_id_from_token() {
        let ctx = RequestContext::new(None, Some(token_for("user-1")), None, None);
        assert_eq!(ctx.user_id(), Some("user-1".to_string()));
    }

    #[test]
    fn test_user_id_missing_header() {
        let ctx = RequestContext::new(None, None, None, None);
        assert_eq!(ctx.user_id(), None);
    }

    #[test]
    fn test_debug_redacts_authorization() {
        let ctx = RequestContext::new(
            Some("https://app.example.com".to_string()),
            Some(token_for("user-1")),
            Some("3".to_string()),
            None,
        );
        let rendered = format!("{ctx:?}");
        assert!(!rendered.contains("user-1"));
        assert!(!rendered.contains("eyJ"), "token leaked into debug output");
        assert!(rendered.contains("REDACTED"));
    }
}
