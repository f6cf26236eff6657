//! Deploy-time and runtime configuration types.
//!
//! `DeployConfig` carries everything the synthesizer needs; it is populated
//! from environment-backed CLI flags by the `postbox-synth` binary and is
//! never read at request time. `RuntimeConfig` is the small slice each
//! Lambda reads once per cold start.

use serde::{Deserialize, Serialize};

/// Region and availability zones the stack is pinned to.
pub const REGION: &str = "ap-northeast-1";

/// Full configuration for a stack synthesis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Application name, e.g. "postbox".
    pub app_name: String,
    /// Environment name, e.g. "dev" or "prod". Also used as the API stage name.
    pub env_name: String,
    /// Default database created on the cluster.
    pub db_name: String,
    /// Source repository owner (recorded in template metadata).
    pub repo_owner_name: String,
    /// Source repository name (recorded in template metadata).
    pub repo_name: String,
    /// Tracked branch (recorded in template metadata).
    pub branch_name: String,
    /// CodeStar connection identifier (recorded in template metadata).
    pub connection_id: String,
    /// Bucket receiving bastion access logs, if any.
    pub s3_logging_bucket_name: Option<String>,
    /// Number of serverless reader instances on the cluster.
    pub reader_num: u32,
    /// Minimum Aurora capacity units.
    pub min_acu: f64,
    /// Maximum Aurora capacity units.
    pub max_acu: f64,
    /// Origins allowed by CORS, or `["*"]`.
    pub allow_origins: Vec<String>,
    /// Recipients of notice-level alarms.
    pub notice_email_addresses: Vec<String>,
    /// Recipients of alert-level alarms.
    pub alert_email_addresses: Vec<String>,
    /// Whether alarms actually fire their SNS actions.
    pub alarm_actions_enabled: bool,
}

impl DeployConfig {
    /// The `{app}-{env}` prefix every resource name carries.
    pub fn app_id(&self) -> String {
        format!("{}-{}", self.app_name, self.env_name)
    }
}

/// Per-function runtime configuration, read once per cold start.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Secrets Manager id (ARN or name) of the connection secret.
    pub db_secret_id: String,
    /// Origins allowed by CORS, or `["*"]`.
    pub allow_origins: Vec<String>,
}
