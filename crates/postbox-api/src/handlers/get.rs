//! GET /messages: all rows, or one row by id.

use postbox_core::repository::{MessageStore, MessageStoreFactory};
use postbox_core::validate;
use postbox_types::config::RuntimeConfig;
use postbox_types::error::ApiError;
use postbox_types::message::Message;

use crate::request::RequestContext;
use crate::response::{Envelope, resolve_allow_origin};

/// Handle one GET /messages invocation.
pub async fn get_messages<F: MessageStoreFactory>(
    ctx: &RequestContext,
    factory: &F,
    config: &RuntimeConfig,
) -> Envelope {
    let allow_origin = resolve_allow_origin(ctx.origin.as_deref(), &config.allow_origins);
    let user_id = ctx.user_id();
    match fetch_messages(ctx, user_id.clone(), factory).await {
        Ok(messages) => Envelope::ok(&messages, allow_origin),
        Err(error) => {
            super::log_request_failure(ctx, user_id.as_deref(), &error);
            Envelope::error(&error, allow_origin)
        }
    }
}

/// Validate, then run the single SELECT. The store is acquired only after
/// validation passes and is closed whether or not the query succeeds.
async fn fetch_messages<F: MessageStoreFactory>(
    ctx: &RequestContext,
    user_id: Option<String>,
    factory: &F,
) -> Result<Vec<Message>, ApiError> {
    validate::require_user_id(user_id)?;
    let id = validate::message_id(ctx.query_id.as_deref())?;
    let mut store = factory.acquire().await?;
    let fetched = store.fetch(id).await;
    if let Err(close_error) = store.close().await {
        tracing::warn!(error = %close_error, "connection close failed");
    }
    Ok(fetched?)
}
