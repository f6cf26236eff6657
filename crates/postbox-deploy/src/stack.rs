//! Resource collector and typed handles.
//!
//! Every resource name carries the `{app}-{env}` prefix; the logical id
//! used inside the template is the PascalCase form of that name. Handles
//! expose `Ref`/`Fn::GetAtt` references; embedding a handle's reference in
//! another resource's properties is what creates a construction-order edge.

use serde_json::{Value, json};
use thiserror::Error;

use crate::graph::construction_order;
use crate::template::Template;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("duplicate logical id '{0}'")]
    DuplicateLogicalId(String),

    #[error("resource '{0}' references unknown resource '{1}'")]
    UnknownReference(String, String),

    #[error("dependency cycle involving '{0}'")]
    DependencyCycle(String),
}

/// Typed reference to one declared resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    logical_id: String,
}

impl ResourceHandle {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// A `Ref` to this resource.
    pub fn reference(&self) -> Value {
        json!({ "Ref": self.logical_id })
    }

    /// A `Fn::GetAtt` on this resource.
    pub fn attribute(&self, name: &str) -> Value {
        json!({ "Fn::GetAtt": [self.logical_id, name] })
    }
}

/// One declared resource.
#[derive(Debug)]
pub struct Resource {
    pub logical_id: String,
    pub kind: String,
    pub properties: Value,
    pub depends_on: Vec<String>,
}

/// A named template output.
#[derive(Debug)]
pub struct Output {
    pub name: String,
    pub value: Value,
}

/// Collects resource declarations for one stack.
pub struct Stack {
    app_id: String,
    description: String,
    metadata: Value,
    resources: Vec<Resource>,
    outputs: Vec<Output>,
}

impl Stack {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            description: String::new(),
            metadata: Value::Null,
            resources: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// The full resource name for a suffix: `{app_id}-{suffix}`.
    pub fn resource_name(&self, suffix: &str) -> String {
        format!("{}-{}", self.app_id, suffix)
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_metadata(&mut self, metadata: Value) {
        self.metadata = metadata;
    }

    /// Declare a resource under `{app_id}-{name_suffix}`.
    pub fn add_resource(
        &mut self,
        name_suffix: &str,
        kind: &str,
        properties: Value,
    ) -> Result<ResourceHandle, DeployError> {
        self.add_resource_with_dependencies(name_suffix, kind, properties, &[])
    }

    /// Declare a resource with explicit construction-order dependencies on
    /// top of whatever its properties reference.
    pub fn add_resource_with_dependencies(
        &mut self,
        name_suffix: &str,
        kind: &str,
        properties: Value,
        depends_on: &[&ResourceHandle],
    ) -> Result<ResourceHandle, DeployError> {
        let logical_id = logical_id(&self.resource_name(name_suffix));
        if self.resources.iter().any(|r| r.logical_id == logical_id) {
            return Err(DeployError::DuplicateLogicalId(logical_id));
        }
        self.resources.push(Resource {
            logical_id: logical_id.clone(),
            kind: kind.to_string(),
            properties,
            depends_on: depends_on
                .iter()
                .map(|h| h.logical_id().to_string())
                .collect(),
        });
        Ok(ResourceHandle { logical_id })
    }

    pub fn add_output(&mut self, name: &str, value: Value) {
        self.outputs.push(Output {
            name: name.to_string(),
            value,
        });
    }

    /// Validate the reference graph and emit the template.
    ///
    /// Fails on references to undeclared resources and on cycles; the
    /// emitted resource map follows the computed construction order.
    pub fn synth(self) -> Result<Template, DeployError> {
        let order = construction_order(&self.resources)?;
        Ok(Template::new(
            self.description,
            self.metadata,
            order
                .into_iter()
                .map(|i| &self.resources[i])
                .collect::<Vec<_>>(),
            &self.outputs,
        ))
    }
}

/// PascalCase logical id for a hyphenated resource name.
pub fn logical_id(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_id_pascal_cases_names() {
        assert_eq!(logical_id("postbox-dev-vpc"), "PostboxDevVpc");
        assert_eq!(logical_id("postbox-dev-lambda-subnet1"), "PostboxDevLambdaSubnet1");
    }

    #[test]
    fn test_duplicate_logical_id_is_rejected() {
        let mut stack = Stack::new("postbox-dev");
        stack
            .add_resource("vpc", "AWS::EC2::VPC", json!({}))
            .unwrap();
        let err = stack.add_resource("vpc", "AWS::EC2::VPC", json!({}));
        assert!(matches!(err, Err(DeployError::DuplicateLogicalId(_))));
    }

    #[test]
    fn test_handle_references() {
        let mut stack = Stack::new("postbox-dev");
        let vpc = stack
            .add_resource("vpc", "AWS::EC2::VPC", json!({}))
            .unwrap();
        assert_eq!(vpc.reference(), json!({ "Ref": "PostboxDevVpc" }));
        assert_eq!(
            vpc.attribute("CidrBlock"),
            json!({ "Fn::GetAtt": ["PostboxDevVpc", "CidrBlock"] })
        );
    }

    #[test]
    fn test_synth_orders_referenced_before_referent() {
        let mut stack = Stack::new("postbox-dev");
        // Declare the dependent first so ordering is actually exercised.
        let igw = stack
            .add_resource("igw", "AWS::EC2::InternetGateway", json!({}))
            .unwrap();
        let vpc = stack
            .add_resource("vpc", "AWS::EC2::VPC", json!({}))
            .unwrap();
        stack
            .add_resource(
                "igw-attachment",
                "AWS::EC2::VPCGatewayAttachment",
                json!({
                    "VpcId": vpc.reference(),
                    "InternetGatewayId": igw.reference(),
                }),
            )
            .unwrap();

        let template = stack.synth().unwrap();
        let ids = template.resource_ids();
        let pos = |id: &str| ids.iter().position(|r| *r == id).unwrap();
        assert!(pos("PostboxDevVpc") < pos("PostboxDevIgwAttachment"));
        assert!(pos("PostboxDevIgw") < pos("PostboxDevIgwAttachment"));
    }

    #[test]
    fn test_synth_rejects_unknown_reference() {
        let mut stack = Stack::new("postbox-dev");
        stack
            .add_resource(
                "route",
                "AWS::EC2::Route",
                json!({ "GatewayId": { "Ref": "NotDeclared" } }),
            )
            .unwrap();
        assert!(matches!(
            stack.synth(),
            Err(DeployError::UnknownReference(_, _))
        ));
    }
}
