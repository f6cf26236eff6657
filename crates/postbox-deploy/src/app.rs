//! Main stack assembly.
//!
//! Wrappers are constructed in dependency order, each receiving the
//! handles of what came before it. Source-control identifiers travel as
//! template metadata only; the pipeline consuming them lives outside this
//! stack.

use serde_json::json;

use postbox_types::config::{DeployConfig, REGION};

use crate::stack::{DeployError, Stack};
use crate::template::Template;
use crate::wrapper::alerting::AlertingWrapper;
use crate::wrapper::api::{ApiWrapper, declare_rest_api};
use crate::wrapper::authorizer::AuthorizerWrapper;
use crate::wrapper::bastion::BastionWrapper;
use crate::wrapper::compute::ComputeWrapper;
use crate::wrapper::database::DatabaseWrapper;
use crate::wrapper::monitoring::MonitoringWrapper;
use crate::wrapper::network::NetworkWrapper;
use crate::wrapper::secrets::SecretsWrapper;

/// Build the full Postbox stack for one environment.
pub fn build_main_stack(config: &DeployConfig) -> Result<Template, DeployError> {
    let mut stack = Stack::new(config.app_id());
    stack.set_description(format!(
        "Postbox message service ({}, {REGION})",
        config.env_name
    ));
    stack.set_metadata(json!({
        "Source": {
            "RepoOwner": config.repo_owner_name,
            "Repo": config.repo_name,
            "Branch": config.branch_name,
            "ConnectionId": config.connection_id,
        },
    }));

    let rest_api = declare_rest_api(&mut stack)?;

    let network = NetworkWrapper::build(&mut stack)?;
    let database = DatabaseWrapper::build(
        &mut stack,
        &network,
        &config.db_name,
        config.reader_num,
        config.min_acu,
        config.max_acu,
    )?;
    let secrets = SecretsWrapper::build(&mut stack, &database)?;
    let compute = ComputeWrapper::build(&mut stack, &network, &secrets, &config.allow_origins)?;
    let authorizer = AuthorizerWrapper::build(&mut stack, &rest_api)?;
    ApiWrapper::build(
        &mut stack,
        &rest_api,
        &authorizer,
        &compute,
        &config.env_name,
        &config.allow_origins,
    )?;
    BastionWrapper::build(&mut stack, &network, config.s3_logging_bucket_name.as_deref())?;
    let alerting = AlertingWrapper::build(
        &mut stack,
        &config.notice_email_addresses,
        &config.alert_email_addresses,
    )?;
    MonitoringWrapper::build(&mut stack, &database, &alerting, config.alarm_actions_enabled)?;

    stack.synth()
}
