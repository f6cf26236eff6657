//! Compute wrapper: the two message Lambda functions.
//!
//! Both run the custom runtime (`provided.al2023`, cargo-lambda `bootstrap`
//! artifacts) inside the Lambda subnets. The GET function carries the
//! reader secret, the POST function the writer secret; each execution role
//! is granted read on exactly its own secret.

use serde_json::json;

use crate::stack::{DeployError, ResourceHandle, Stack};
use crate::wrapper::network::NetworkWrapper;
use crate::wrapper::secrets::SecretsWrapper;

const RUNTIME: &str = "provided.al2023";
const HANDLER: &str = "bootstrap";
const TIMEOUT_SECONDS: u32 = 30;

/// Handles for the API wrapper to integrate.
pub struct ComputeWrapper {
    pub messages_get: ResourceHandle,
    pub messages_post: ResourceHandle,
}

impl ComputeWrapper {
    pub fn build(
        stack: &mut Stack,
        network: &NetworkWrapper,
        secrets: &SecretsWrapper,
        allow_origins: &[String],
    ) -> Result<Self, DeployError> {
        let allow_origins = allow_origins.join(",");
        let messages_get = create_function(
            stack,
            network,
            "api-messages-get",
            "messages-get",
            &secrets.reader_secret,
            &allow_origins,
        )?;
        let messages_post = create_function(
            stack,
            network,
            "api-messages-post",
            "messages-post",
            &secrets.writer_secret,
            &allow_origins,
        )?;
        Ok(Self {
            messages_get,
            messages_post,
        })
    }
}

fn create_function(
    stack: &mut Stack,
    network: &NetworkWrapper,
    name_suffix: &str,
    artifact: &str,
    secret: &ResourceHandle,
    allow_origins: &str,
) -> Result<ResourceHandle, DeployError> {
    let function_name = stack.resource_name(name_suffix);
    let role = create_execution_role(stack, name_suffix, secret)?;
    stack.add_resource(
        name_suffix,
        "AWS::Lambda::Function",
        json!({
            "FunctionName": function_name,
            "Runtime": RUNTIME,
            "Handler": HANDLER,
            "Architectures": ["arm64"],
            "Code": {
                "S3Bucket": format!("{}-artifacts", stack.app_id()),
                "S3Key": format!("{artifact}/bootstrap.zip"),
            },
            "Timeout": TIMEOUT_SECONDS,
            "Role": role.attribute("Arn"),
            "Environment": {
                "Variables": {
                    "DB_SECRET_ID": secret.reference(),
                    "ALLOW_ORIGINS": allow_origins,
                },
            },
            "VpcConfig": {
                "SubnetIds": network
                    .lambda_subnets
                    .iter()
                    .map(ResourceHandle::reference)
                    .collect::<Vec<_>>(),
                "SecurityGroupIds": [network.lambda_security_group.attribute("GroupId")],
            },
        }),
    )
}

fn create_execution_role(
    stack: &mut Stack,
    name_suffix: &str,
    secret: &ResourceHandle,
) -> Result<ResourceHandle, DeployError> {
    let role_name = stack.resource_name(&format!("{name_suffix}-role"));
    stack.add_resource(
        &format!("{name_suffix}-role"),
        "AWS::IAM::Role",
        json!({
            "RoleName": role_name,
            "AssumeRolePolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": { "Service": "lambda.amazonaws.com" },
                    "Action": "sts:AssumeRole",
                }],
            },
            "ManagedPolicyArns": [
                "arn:aws:iam::aws:policy/service-role/AWSLambdaVPCAccessExecutionRole",
            ],
            "Policies": [{
                "PolicyName": "secret-read",
                "PolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Action": [
                            "secretsmanager:GetSecretValue",
                            "secretsmanager:DescribeSecret",
                        ],
                        "Resource": secret.reference(),
                    }],
                },
            }],
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrapper::database::DatabaseWrapper;

    fn build() -> crate::template::Template {
        let mut stack = Stack::new("postbox-dev");
        let network = NetworkWrapper::build(&mut stack).unwrap();
        let database =
            DatabaseWrapper::build(&mut stack, &network, "postbox", 1, 0.5, 2.0).unwrap();
        let secrets = SecretsWrapper::build(&mut stack, &database).unwrap();
        ComputeWrapper::build(
            &mut stack,
            &network,
            &secrets,
            &["https://app.example.com".to_string()],
        )
        .unwrap();
        stack.synth().unwrap()
    }

    #[test]
    fn test_get_function_wires_reader_secret() {
        let template = build();
        let function = template.resource("PostboxDevApiMessagesGet").unwrap();
        let env = &function["Properties"]["Environment"]["Variables"];
        assert_eq!(
            env["DB_SECRET_ID"],
            serde_json::json!({ "Ref": "PostboxDevDbReaderSecret" })
        );
        assert_eq!(env["ALLOW_ORIGINS"], "https://app.example.com");
        assert_eq!(function["Properties"]["Timeout"], 30);
    }

    #[test]
    fn test_post_function_wires_writer_secret() {
        let template = build();
        let function = template.resource("PostboxDevApiMessagesPost").unwrap();
        assert_eq!(
            function["Properties"]["Environment"]["Variables"]["DB_SECRET_ID"],
            serde_json::json!({ "Ref": "PostboxDevDbWriterSecret" })
        );
    }

    #[test]
    fn test_functions_sit_in_lambda_subnets() {
        let template = build();
        let function = template.resource("PostboxDevApiMessagesGet").unwrap();
        let subnets = function["Properties"]["VpcConfig"]["SubnetIds"]
            .as_array()
            .unwrap();
        assert_eq!(subnets.len(), 3);
    }

    #[test]
    fn test_role_grants_read_on_own_secret_only() {
        let template = build();
        let role = template.resource("PostboxDevApiMessagesGetRole").unwrap();
        let statement = &role["Properties"]["Policies"][0]["PolicyDocument"]["Statement"][0];
        assert_eq!(
            statement["Resource"],
            serde_json::json!({ "Ref": "PostboxDevDbReaderSecret" })
        );
    }
}
