//! API wrapper: REST API, the `/messages` resource, and its methods.
//!
//! The REST API itself is declared first (the authorizer wrapper needs its
//! handle); `ApiWrapper::build` then adds the resource tree, the proxy
//! integrations, the CORS preflight, invoke permissions, and the
//! deployment/stage pair named after the environment.

use serde_json::{Value, json};

use postbox_types::config::REGION;

use crate::stack::{DeployError, ResourceHandle, Stack};
use crate::wrapper::authorizer::AuthorizerWrapper;
use crate::wrapper::compute::ComputeWrapper;

/// Declare the REST API shell.
pub fn declare_rest_api(stack: &mut Stack) -> Result<ResourceHandle, DeployError> {
    let api_name = stack.resource_name("api");
    stack.add_resource(
        "api",
        "AWS::ApiGateway::RestApi",
        json!({
            "Name": api_name,
            "EndpointConfiguration": { "Types": ["REGIONAL"] },
        }),
    )
}

pub struct ApiWrapper;

impl ApiWrapper {
    pub fn build(
        stack: &mut Stack,
        rest_api: &ResourceHandle,
        authorizer: &AuthorizerWrapper,
        compute: &ComputeWrapper,
        stage_name: &str,
        allow_origins: &[String],
    ) -> Result<(), DeployError> {
        let messages = stack.add_resource(
            "api-messages",
            "AWS::ApiGateway::Resource",
            json!({
                "RestApiId": rest_api.reference(),
                "ParentId": rest_api.attribute("RootResourceId"),
                "PathPart": "messages",
            }),
        )?;

        let get = create_method(
            stack,
            rest_api,
            &messages,
            authorizer,
            "GET",
            &compute.messages_get,
        )?;
        let post = create_method(
            stack,
            rest_api,
            &messages,
            authorizer,
            "POST",
            &compute.messages_post,
        )?;
        let options = create_preflight(stack, rest_api, &messages, allow_origins)?;

        create_permission(stack, "api-messages-get-permission", &compute.messages_get)?;
        create_permission(stack, "api-messages-post-permission", &compute.messages_post)?;

        let deployment = stack.add_resource_with_dependencies(
            "api-deployment",
            "AWS::ApiGateway::Deployment",
            json!({ "RestApiId": rest_api.reference() }),
            &[&get, &post, &options],
        )?;
        stack.add_resource(
            "api-stage",
            "AWS::ApiGateway::Stage",
            json!({
                "RestApiId": rest_api.reference(),
                "DeploymentId": deployment.reference(),
                "StageName": stage_name,
            }),
        )?;
        Ok(())
    }
}

fn create_method(
    stack: &mut Stack,
    rest_api: &ResourceHandle,
    resource: &ResourceHandle,
    authorizer: &AuthorizerWrapper,
    http_method: &str,
    function: &ResourceHandle,
) -> Result<ResourceHandle, DeployError> {
    stack.add_resource(
        &format!("api-messages-{}-method", http_method.to_ascii_lowercase()),
        "AWS::ApiGateway::Method",
        json!({
            "RestApiId": rest_api.reference(),
            "ResourceId": resource.reference(),
            "HttpMethod": http_method,
            "AuthorizationType": "COGNITO_USER_POOLS",
            "AuthorizerId": authorizer.authorizer.reference(),
            "Integration": {
                "Type": "AWS_PROXY",
                "IntegrationHttpMethod": "POST",
                "Uri": invocation_uri(function),
            },
        }),
    )
}

/// CORS preflight: a MOCK integration answering OPTIONS with the
/// configured origin list.
fn create_preflight(
    stack: &mut Stack,
    rest_api: &ResourceHandle,
    resource: &ResourceHandle,
    allow_origins: &[String],
) -> Result<ResourceHandle, DeployError> {
    let allow_origin = format!("'{}'", allow_origins.join(","));
    stack.add_resource(
        "api-messages-options-method",
        "AWS::ApiGateway::Method",
        json!({
            "RestApiId": rest_api.reference(),
            "ResourceId": resource.reference(),
            "HttpMethod": "OPTIONS",
            "AuthorizationType": "NONE",
            "Integration": {
                "Type": "MOCK",
                "RequestTemplates": { "application/json": "{\"statusCode\": 200}" },
                "IntegrationResponses": [{
                    "StatusCode": "200",
                    "ResponseParameters": {
                        "method.response.header.Access-Control-Allow-Origin": allow_origin,
                        "method.response.header.Access-Control-Allow-Methods": "'*'",
                        "method.response.header.Access-Control-Allow-Headers": "'*'",
                    },
                }],
            },
            "MethodResponses": [{
                "StatusCode": "200",
                "ResponseParameters": {
                    "method.response.header.Access-Control-Allow-Origin": true,
                    "method.response.header.Access-Control-Allow-Methods": true,
                    "method.response.header.Access-Control-Allow-Headers": true,
                },
            }],
        }),
    )
}

fn create_permission(
    stack: &mut Stack,
    name_suffix: &str,
    function: &ResourceHandle,
) -> Result<(), DeployError> {
    stack.add_resource(
        name_suffix,
        "AWS::Lambda::Permission",
        json!({
            "FunctionName": function.reference(),
            "Action": "lambda:InvokeFunction",
            "Principal": "apigateway.amazonaws.com",
        }),
    )?;
    Ok(())
}

fn invocation_uri(function: &ResourceHandle) -> Value {
    json!({
        "Fn::Join": ["", [
            format!("arn:aws:apigateway:{REGION}:lambda:path/2015-03-31/functions/"),
            function.attribute("Arn"),
            "/invocations",
        ]],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrapper::database::DatabaseWrapper;
    use crate::wrapper::network::NetworkWrapper;
    use crate::wrapper::secrets::SecretsWrapper;

    fn build() -> crate::template::Template {
        let mut stack = Stack::new("postbox-dev");
        let rest_api = declare_rest_api(&mut stack).unwrap();
        let network = NetworkWrapper::build(&mut stack).unwrap();
        let database =
            DatabaseWrapper::build(&mut stack, &network, "postbox", 1, 0.5, 2.0).unwrap();
        let secrets = SecretsWrapper::build(&mut stack, &database).unwrap();
        let compute =
            ComputeWrapper::build(&mut stack, &network, &secrets, &["*".to_string()]).unwrap();
        let authorizer = AuthorizerWrapper::build(&mut stack, &rest_api).unwrap();
        ApiWrapper::build(
            &mut stack,
            &rest_api,
            &authorizer,
            &compute,
            "dev",
            &["*".to_string()],
        )
        .unwrap();
        stack.synth().unwrap()
    }

    #[test]
    fn test_both_methods_are_authorized_proxies() {
        let template = build();
        for (id, function) in [
            ("PostboxDevApiMessagesGetMethod", "PostboxDevApiMessagesGet"),
            ("PostboxDevApiMessagesPostMethod", "PostboxDevApiMessagesPost"),
        ] {
            let method = template.resource(id).unwrap();
            let props = &method["Properties"];
            assert_eq!(props["AuthorizationType"], "COGNITO_USER_POOLS");
            assert_eq!(
                props["AuthorizerId"],
                serde_json::json!({ "Ref": "PostboxDevAuthorizer" })
            );
            assert_eq!(props["Integration"]["Type"], "AWS_PROXY");
            let uri_parts = props["Integration"]["Uri"]["Fn::Join"][1].as_array().unwrap();
            assert_eq!(
                uri_parts[1],
                serde_json::json!({ "Fn::GetAtt": [function, "Arn"] })
            );
        }
    }

    #[test]
    fn test_preflight_is_an_open_mock() {
        let template = build();
        let options = template.resource("PostboxDevApiMessagesOptionsMethod").unwrap();
        assert_eq!(options["Properties"]["AuthorizationType"], "NONE");
        assert_eq!(options["Properties"]["Integration"]["Type"], "MOCK");
    }

    #[test]
    fn test_stage_uses_environment_name() {
        let template = build();
        let stage = template.resource("PostboxDevApiStage").unwrap();
        assert_eq!(stage["Properties"]["StageName"], "dev");
    }

    #[test]
    fn test_deployment_waits_for_methods() {
        let template = build();
        let deployment = template.resource("PostboxDevApiDeployment").unwrap();
        let depends = deployment["DependsOn"].as_array().unwrap();
        assert_eq!(depends.len(), 3);
    }
}
