//! Secrets wrapper: per-role connection secrets.
//!
//! Three secrets (developer, writer, reader), each holding the JSON
//! document `postbox_types::credentials::DbCredentials` deserializes at
//! request time: static connection fields in the template plus a generated
//! `password`. Writer and developer point at the cluster endpoint, reader
//! at the reader endpoint.

use serde_json::{Value, json};

use crate::stack::{DeployError, ResourceHandle, Stack};
use crate::wrapper::database::DatabaseWrapper;

/// Handles for the compute wrapper to wire into the Lambda environment.
pub struct SecretsWrapper {
    pub writer_secret: ResourceHandle,
    pub reader_secret: ResourceHandle,
}

impl SecretsWrapper {
    pub fn build(stack: &mut Stack, database: &DatabaseWrapper) -> Result<Self, DeployError> {
        create_secret(stack, database, "developer", true)?;
        let writer_secret = create_secret(stack, database, "writer", true)?;
        let reader_secret = create_secret(stack, database, "reader", false)?;
        Ok(Self {
            writer_secret,
            reader_secret,
        })
    }
}

fn create_secret(
    stack: &mut Stack,
    database: &DatabaseWrapper,
    username: &str,
    is_writer: bool,
) -> Result<ResourceHandle, DeployError> {
    let secret_name = format!("{}-{username}-secret", database.cluster_id);
    stack.add_resource(
        &format!("db-{username}-secret"),
        "AWS::SecretsManager::Secret",
        json!({
            "Name": secret_name,
            "GenerateSecretString": {
                "SecretStringTemplate": secret_template(database, username, is_writer),
                "GenerateStringKey": "password",
                "ExcludePunctuation": true,
                "IncludeSpace": false,
            },
        }),
    )
}

/// The connection document with the endpoint address and port spliced in
/// at deploy time.
fn secret_template(database: &DatabaseWrapper, username: &str, is_writer: bool) -> Value {
    let endpoint_attribute = if is_writer { "Endpoint" } else { "ReadEndpoint" };
    json!({
        "Fn::Join": ["", [
            format!("{{\"username\":\"{username}\",\"host\":\""),
            database.cluster.attribute(&format!("{endpoint_attribute}.Address")),
            "\",\"engine\":\"mysql\",\"port\":\"",
            database.cluster.attribute("Endpoint.Port"),
            format!(
                "\",\"dbClusterIdentifier\":\"{}\",\"dbname\":\"{}\"}}",
                database.cluster_id, database.db_name
            ),
        ]],
    })
}
