//! Cold-start environment loading for the Lambda binaries.
//!
//! `DB_SECRET_ID` and `ALLOW_ORIGINS` are injected by the compute wrapper
//! at deploy time and read exactly once per cold start. Everything else in
//! the configuration surface is deploy-time only.

use postbox_types::config::RuntimeConfig;
use thiserror::Error;

pub const DB_SECRET_ID_VAR: &str = "DB_SECRET_ID";
pub const ALLOW_ORIGINS_VAR: &str = "ALLOW_ORIGINS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}

/// Read the per-function runtime configuration from the environment.
pub fn load_runtime_config() -> Result<RuntimeConfig, ConfigError> {
    let db_secret_id =
        std::env::var(DB_SECRET_ID_VAR).map_err(|_| ConfigError::MissingVar(DB_SECRET_ID_VAR))?;
    let allow_origins =
        std::env::var(ALLOW_ORIGINS_VAR).map_err(|_| ConfigError::MissingVar(ALLOW_ORIGINS_VAR))?;
    Ok(RuntimeConfig {
        db_secret_id,
        allow_origins: split_origins(&allow_origins),
    })
}

/// Split the comma-separated origin list, dropping empty entries.
pub fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_origins() {
        assert_eq!(split_origins("*"), vec!["*"]);
        assert_eq!(
            split_origins("https://a.example.com, https://b.example.com"),
            vec!["https://a.example.com", "https://b.example.com"]
        );
        assert!(split_origins("").is_empty());
    }

    #[test]
    fn test_load_runtime_config_round_trip() {
        // SAFETY: no other test in this crate touches these variables.
        unsafe {
            std::env::remove_var(DB_SECRET_ID_VAR);
            std::env::remove_var(ALLOW_ORIGINS_VAR);
        }
        assert!(matches!(
            load_runtime_config(),
            Err(ConfigError::MissingVar(DB_SECRET_ID_VAR))
        ));

        // SAFETY: same as above.
        unsafe {
            std::env::set_var(DB_SECRET_ID_VAR, "postbox-dev-db-reader-secret");
            std::env::set_var(ALLOW_ORIGINS_VAR, "https://app.example.com,*");
        }
        let config = load_runtime_config().unwrap();
        assert_eq!(config.db_secret_id, "postbox-dev-db-reader-secret");
        assert_eq!(config.allow_origins, vec!["https://app.example.com", "*"]);

        // SAFETY: cleanup of the variables set above.
        unsafe {
            std::env::remove_var(DB_SECRET_ID_VAR);
            std::env::remove_var(ALLOW_ORIGINS_VAR);
        }
    }
}
