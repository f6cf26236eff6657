//! POST /messages: insert one row inside an explicit transaction.

use postbox_core::repository::{MessageStore, MessageStoreFactory};
use postbox_core::validate;
use postbox_types::config::RuntimeConfig;
use postbox_types::error::ApiError;

use crate::request::RequestContext;
use crate::response::{Envelope, resolve_allow_origin};

/// Handle one POST /messages invocation. Success carries the body `true`.
pub async fn post_message<F: MessageStoreFactory>(
    ctx: &RequestContext,
    factory: &F,
    config: &RuntimeConfig,
) -> Envelope {
    let allow_origin = resolve_allow_origin(ctx.origin.as_deref(), &config.allow_origins);
    let user_id = ctx.user_id();
    match insert_message(ctx, user_id.clone(), factory).await {
        Ok(()) => Envelope::ok(&true, allow_origin),
        Err(error) => {
            super::log_request_failure(ctx, user_id.as_deref(), &error);
            Envelope::error(&error, allow_origin)
        }
    }
}

/// Validate, then run the single INSERT. The store commits or rolls back
/// internally; here it only has to be closed on both outcomes.
async fn insert_message<F: MessageStoreFactory>(
    ctx: &RequestContext,
    user_id: Option<String>,
    factory: &F,
) -> Result<(), ApiError> {
    let user_id = validate::require_user_id(user_id)?;
    let message = validate::new_message(ctx.body.as_deref(), user_id)?;
    let mut store = factory.acquire().await?;
    let inserted = store.insert(&message).await;
    if let Err(close_error) = store.close().await {
        tracing::warn!(error = %close_error, "connection close failed");
    }
    Ok(inserted?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::get::get_messages;
    use crate::handlers::testing::{StubFactory, token_for};
    use postbox_types::message::MAX_CONTENT_CHARS;

    fn config() -> RuntimeConfig {
        RuntimeConfig {
            db_secret_id: "writer-secret".to_string(),
            allow_origins: vec!["*".to_string()],
        }
    }

    fn post_ctx(authorization: Option<String>, body: Option<&str>) -> RequestContext {
        RequestContext::new(None, authorization, None, body.map(str::to_string))
    }

    #[tokio::test]
    async fn test_insert_persists_row_for_caller() {
        let factory = StubFactory::default();
        let envelope = post_message(
            &post_ctx(Some(token_for("user-1")), Some(r#"{"content":"hello"}"#)),
            &factory,
            &config(),
        )
        .await;

        assert_eq!(envelope.status, 200);
        assert_eq!(envelope.body, "true");
        assert!(factory.was_closed());

        let rows = factory.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].content, "hello");
        assert_eq!(rows[0].user_id, "user-1");
    }

    #[tokio::test]
    async fn test_oversized_content_is_403_and_nothing_is_inserted() {
        let factory = StubFactory::default();
        let body = serde_json::json!({ "content": "a".repeat(MAX_CONTENT_CHARS + 1) }).to_string();
        let envelope = post_message(
            &post_ctx(Some(token_for("user-1")), Some(&body)),
            &factory,
            &config(),
        )
        .await;

        assert_eq!(envelope.status, 403);
        assert_eq!(factory.acquired_count(), 0);
        assert!(factory.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_token_is_401_without_store_acquisition() {
        let factory = StubFactory::default();
        let envelope = post_message(
            &post_ctx(None, Some(r#"{"content":"hello"}"#)),
            &factory,
            &config(),
        )
        .await;

        assert_eq!(envelope.status, 401);
        assert_eq!(factory.acquired_count(), 0);
    }

    #[tokio::test]
    async fn test_insert_failure_is_generic_500_and_closes() {
        let factory = StubFactory {
            fail_insert: true,
            ..StubFactory::default()
        };
        let envelope = post_message(
            &post_ctx(Some(token_for("user-1")), Some(r#"{"content":"hello"}"#)),
            &factory,
            &config(),
        )
        .await;

        assert_eq!(envelope.status, 500);
        assert!(!envelope.body.contains("stub insert failure"));
        assert!(factory.was_closed());
        assert!(factory.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_post_then_get_by_id_round_trip() {
        let factory = StubFactory::default();
        let posted = post_message(
            &post_ctx(Some(token_for("user-1")), Some(r#"{"content":"hello"}"#)),
            &factory,
            &config(),
        )
        .await;
        assert_eq!(posted.status, 200);

        let get_ctx = RequestContext::new(
            None,
            Some(token_for("user-1")),
            Some("1".to_string()),
            None,
        );
        let fetched = get_messages(&get_ctx, &factory, &config()).await;
        assert_eq!(fetched.status, 200);

        let rows: Vec<serde_json::Value> = serde_json::from_str(&fetched.body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["content"], "hello");
        assert_eq!(rows[0]["user_id"], "user-1");
    }
}
