//! Database connection credentials as stored in Secrets Manager.
//!
//! Each connection secret is a JSON document produced by the secret template
//! in the deploy layer: the static fields below plus a generated `password`.
//! `port` is stored as a string, matching the template.

use serde::{Deserialize, Serialize};

use crate::error::SecretError;

/// Connection credentials for the messages database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbCredentials {
    pub username: String,
    pub password: String,
    pub host: String,
    /// Stored as a string in the secret body.
    pub port: String,
    pub dbname: String,
    pub engine: String,
    #[serde(rename = "dbClusterIdentifier")]
    pub db_cluster_identifier: String,
}

impl DbCredentials {
    /// Parse a secret string payload into credentials.
    pub fn from_secret_string(raw: &str) -> Result<Self, SecretError> {
        serde_json::from_str(raw).map_err(|e| SecretError::Malformed(e.to_string()))
    }

    /// The numeric port, parsed from the stored string.
    pub fn port_number(&self) -> Result<u16, SecretError> {
        self.port
            .parse()
            .map_err(|_| SecretError::Malformed(format!("invalid port '{}'", self.port)))
    }
}
