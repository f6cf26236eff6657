//! Authorizer wrapper: Cognito user pool and REST API authorizer.

use serde_json::json;

use crate::stack::{DeployError, ResourceHandle, Stack};

/// Handle for the API wrapper to attach to its methods.
pub struct AuthorizerWrapper {
    pub authorizer: ResourceHandle,
}

impl AuthorizerWrapper {
    pub fn build(stack: &mut Stack, rest_api: &ResourceHandle) -> Result<Self, DeployError> {
        let user_pool = create_user_pool(stack)?;
        create_user_pool_client(stack, &user_pool)?;
        let authorizer = create_authorizer(stack, rest_api, &user_pool)?;
        Ok(Self { authorizer })
    }
}

fn create_user_pool(stack: &mut Stack) -> Result<ResourceHandle, DeployError> {
    let pool_name = stack.resource_name("user-pool");
    let user_pool = stack.add_resource(
        "user-pool",
        "AWS::Cognito::UserPool",
        json!({
            "UserPoolName": pool_name,
            // Self sign-up enabled; sign-in by username or email.
            "AdminCreateUserConfig": { "AllowAdminCreateUserOnly": false },
            "AliasAttributes": ["email"],
        }),
    )?;
    stack.add_output("UserPoolId", user_pool.reference());
    Ok(user_pool)
}

fn create_user_pool_client(
    stack: &mut Stack,
    user_pool: &ResourceHandle,
) -> Result<ResourceHandle, DeployError> {
    let client_name = stack.resource_name("user-pool-client");
    let client = stack.add_resource(
        "user-pool-client",
        "AWS::Cognito::UserPoolClient",
        json!({
            "ClientName": client_name,
            "UserPoolId": user_pool.reference(),
            "GenerateSecret": false,
            "ExplicitAuthFlows": [
                "ALLOW_ADMIN_USER_PASSWORD_AUTH",
                "ALLOW_CUSTOM_AUTH",
                "ALLOW_USER_PASSWORD_AUTH",
                "ALLOW_USER_SRP_AUTH",
                "ALLOW_REFRESH_TOKEN_AUTH",
            ],
        }),
    )?;
    stack.add_output("UserPoolClientId", client.reference());
    Ok(client)
}

fn create_authorizer(
    stack: &mut Stack,
    rest_api: &ResourceHandle,
    user_pool: &ResourceHandle,
) -> Result<ResourceHandle, DeployError> {
    let authorizer_name = stack.resource_name("authorizer");
    stack.add_resource(
        "authorizer",
        "AWS::ApiGateway::Authorizer",
        json!({
            "Name": authorizer_name,
            "RestApiId": rest_api.reference(),
            "Type": "COGNITO_USER_POOLS",
            "IdentitySource": "method.request.header.Authorization",
            "ProviderARNs": [user_pool.attribute("Arn")],
        }),
    )
}
