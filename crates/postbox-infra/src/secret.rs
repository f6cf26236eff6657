//! AWS Secrets Manager credential source.
//!
//! Credentials are fetched fresh on every store acquisition, matching the
//! per-invocation connection model. The Lambda subnets reach Secrets
//! Manager through the interface endpoint declared by the deploy layer.

use aws_sdk_secretsmanager::Client;

use postbox_core::repository::CredentialSource;
use postbox_types::credentials::DbCredentials;
use postbox_types::error::SecretError;

/// Secrets Manager-backed [`CredentialSource`].
#[derive(Clone)]
pub struct AwsCredentialSource {
    client: Client,
}

impl AwsCredentialSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient Lambda environment.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

impl CredentialSource for AwsCredentialSource {
    async fn fetch(&self, secret_id: &str) -> Result<DbCredentials, SecretError> {
        let response = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| SecretError::Fetch(e.to_string()))?;
        let raw = response.secret_string().ok_or(SecretError::NotFound)?;
        DbCredentials::from_secret_string(raw)
    }
}
