//! The two message handlers.
//!
//! Both follow the same shape: resolve CORS, derive the caller identity,
//! validate, acquire one store, run the single statement, close the store
//! on every path, and map any failure to exactly one response. Failures
//! are logged once here, at the handler boundary, with the request context
//! (bearer token redacted) and the derived user id.

pub mod get;
pub mod post;

pub use get::get_messages;
pub use post::post_message;

use postbox_types::error::ApiError;

use crate::request::RequestContext;

fn log_request_failure(ctx: &RequestContext, user_id: Option<&str>, error: &ApiError) {
    tracing::error!(
        request = ?ctx,
        user_id = user_id.unwrap_or_default(),
        status = error.status_code(),
        error = %error,
        "request failed"
    );
}
