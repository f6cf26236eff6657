//! Database wrapper: Aurora MySQL Serverless v2 cluster.
//!
//! One writer plus a configurable number of readers that scale with the
//! writer. The admin password lives in a generated Secrets Manager secret
//! referenced through a dynamic reference; the per-role connection secrets
//! are declared separately by the secrets wrapper.

use serde_json::{Value, json};

use crate::stack::{DeployError, ResourceHandle, Stack};
use crate::wrapper::network::NetworkWrapper;

const ENGINE: &str = "aurora-mysql";
const ENGINE_VERSION: &str = "8.0.mysql_aurora.3.03.0";
const PARAMETER_GROUP_FAMILY: &str = "aurora-mysql8.0";
const CHARACTER_SET: &str = "utf8mb4";
const MONITORING_INTERVAL_SECONDS: u32 = 60;

/// Handles exposed to the secrets and monitoring wrappers.
pub struct DatabaseWrapper {
    pub cluster: ResourceHandle,
    pub cluster_id: String,
    pub db_name: String,
}

impl DatabaseWrapper {
    pub fn build(
        stack: &mut Stack,
        network: &NetworkWrapper,
        db_name: &str,
        reader_num: u32,
        min_acu: f64,
        max_acu: f64,
    ) -> Result<Self, DeployError> {
        let cluster_id = stack.resource_name("db");

        let subnet_group = stack.add_resource(
            "db-subnet-group",
            "AWS::RDS::DBSubnetGroup",
            json!({
                "DBSubnetGroupDescription": format!("{cluster_id} subnets"),
                "SubnetIds": network
                    .db_subnets
                    .iter()
                    .map(ResourceHandle::reference)
                    .collect::<Vec<_>>(),
            }),
        )?;

        let parameter_group = stack.add_resource(
            "db-cluster-params",
            "AWS::RDS::DBClusterParameterGroup",
            json!({
                "Description": format!("{cluster_id} cluster parameters"),
                "Family": PARAMETER_GROUP_FAMILY,
                "Parameters": {
                    "time_zone": "Asia/Tokyo",
                    "character_set_client": CHARACTER_SET,
                    "character_set_connection": CHARACTER_SET,
                    "character_set_database": CHARACTER_SET,
                    "character_set_results": CHARACTER_SET,
                    "character_set_server": CHARACTER_SET,
                    "innodb_file_per_table": "1",
                    "skip-character-set-client-handshake": "1",
                    "init_connect": format!("SET NAMES {CHARACTER_SET}"),
                },
            }),
        )?;

        let admin_secret = stack.add_resource(
            "db-admin-secret",
            "AWS::SecretsManager::Secret",
            json!({
                "Name": format!("{cluster_id}-admin-secret"),
                "GenerateSecretString": {
                    "SecretStringTemplate": "{\"username\":\"admin\"}",
                    "GenerateStringKey": "password",
                    "ExcludePunctuation": true,
                    "IncludeSpace": false,
                },
            }),
        )?;

        let cluster = stack.add_resource(
            "db",
            "AWS::RDS::DBCluster",
            json!({
                "DBClusterIdentifier": cluster_id,
                "Engine": ENGINE,
                "EngineVersion": ENGINE_VERSION,
                "DatabaseName": db_name,
                "DBSubnetGroupName": subnet_group.reference(),
                "DBClusterParameterGroupName": parameter_group.reference(),
                "VpcSecurityGroupIds": [network.db_security_group.attribute("GroupId")],
                "MasterUsername": "admin",
                "MasterUserPassword": secret_password_reference(&admin_secret),
                "ServerlessV2ScalingConfiguration": {
                    "MinCapacity": min_acu,
                    "MaxCapacity": max_acu,
                },
                "StorageEncrypted": true,
                "DeletionProtection": true,
                "EnableCloudwatchLogsExports": ["slowquery", "error", "audit"],
            }),
        )?;

        let monitoring_role = stack.add_resource(
            "db-monitoring-role",
            "AWS::IAM::Role",
            json!({
                "RoleName": format!("{cluster_id}-monitoring-role"),
                "AssumeRolePolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": { "Service": "monitoring.rds.amazonaws.com" },
                        "Action": "sts:AssumeRole",
                    }],
                },
                "ManagedPolicyArns": [
                    "arn:aws:iam::aws:policy/service-role/AmazonRDSEnhancedMonitoringRole",
                ],
            }),
        )?;

        create_instance(stack, &cluster, &monitoring_role, "writer", 0)?;
        for index in 0..reader_num {
            let id = format!("reader{:02}", index + 1);
            create_instance(stack, &cluster, &monitoring_role, &id, 1)?;
        }

        Ok(Self {
            cluster,
            cluster_id,
            db_name: db_name.to_string(),
        })
    }
}

/// Dynamic reference resolving the generated admin password at deploy time.
fn secret_password_reference(secret: &ResourceHandle) -> Value {
    json!({
        "Fn::Join": ["", [
            "{{resolve:secretsmanager:",
            secret.reference(),
            ":SecretString:password}}",
        ]],
    })
}

fn create_instance(
    stack: &mut Stack,
    cluster: &ResourceHandle,
    monitoring_role: &ResourceHandle,
    name_suffix: &str,
    promotion_tier: u32,
) -> Result<ResourceHandle, DeployError> {
    stack.add_resource(
        &format!("db-{name_suffix}"),
        "AWS::RDS::DBInstance",
        json!({
            "DBClusterIdentifier": cluster.reference(),
            "DBInstanceClass": "db.serverless",
            "Engine": ENGINE,
            "AutoMinorVersionUpgrade": true,
            "EnablePerformanceInsights": true,
            "CACertificateIdentifier": "rds-ca-ecc384-g1",
            "MonitoringInterval": MONITORING_INTERVAL_SECONDS,
            "MonitoringRoleArn": monitoring_role.attribute("Arn"),
            "PromotionTier": promotion_tier,
        }),
    )
}
