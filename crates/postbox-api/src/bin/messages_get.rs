//! Lambda entry point for GET /messages.
//!
//! Cold start: tracing, runtime config (`DB_SECRET_ID` points at the
//! reader secret), AWS credential source. Per event: adapt the proxy
//! request and run the handler.

use lambda_http::{Error, Request, run, service_fn};

use postbox_api::handlers;
use postbox_api::request::RequestContext;
use postbox_infra::config::load_runtime_config;
use postbox_infra::mysql::MysqlStoreFactory;
use postbox_infra::secret::AwsCredentialSource;

#[tokio::main]
async fn main() -> Result<(), Error> {
    postbox_observe::tracing_setup::init_lambda();

    let config = load_runtime_config()?;
    let credentials = AwsCredentialSource::from_env().await;
    let factory = MysqlStoreFactory::new(credentials, config.db_secret_id.clone());

    run(service_fn(|event: Request| {
        let factory = &factory;
        let config = &config;
        async move {
            let ctx = RequestContext::from_lambda(&event);
            let envelope = handlers::get_messages(&ctx, factory, config).await;
            Ok::<_, Error>(envelope.into_response())
        }
    }))
    .await
}
