//! The synthesized CloudFormation-style template.

use serde_json::{Map, Value, json};

use crate::stack::{Output, Resource};

/// An immutable, validated template document.
#[derive(Debug)]
pub struct Template {
    doc: Value,
}

impl Template {
    pub(crate) fn new(
        description: String,
        metadata: Value,
        ordered_resources: Vec<&Resource>,
        outputs: &[Output],
    ) -> Self {
        let mut resources = Map::new();
        for resource in ordered_resources {
            let mut entry = Map::new();
            entry.insert("Type".to_string(), Value::String(resource.kind.clone()));
            entry.insert("Properties".to_string(), resource.properties.clone());
            if !resource.depends_on.is_empty() {
                entry.insert(
                    "DependsOn".to_string(),
                    Value::Array(
                        resource
                            .depends_on
                            .iter()
                            .map(|d| Value::String(d.clone()))
                            .collect(),
                    ),
                );
            }
            resources.insert(resource.logical_id.clone(), Value::Object(entry));
        }

        let mut doc = Map::new();
        doc.insert(
            "AWSTemplateFormatVersion".to_string(),
            Value::String("2010-09-09".to_string()),
        );
        if !description.is_empty() {
            doc.insert("Description".to_string(), Value::String(description));
        }
        if !metadata.is_null() {
            doc.insert("Metadata".to_string(), metadata);
        }
        doc.insert("Resources".to_string(), Value::Object(resources));
        if !outputs.is_empty() {
            let mut rendered = Map::new();
            for output in outputs {
                rendered.insert(output.name.clone(), json!({ "Value": output.value }));
            }
            doc.insert("Outputs".to_string(), Value::Object(rendered));
        }

        Self {
            doc: Value::Object(doc),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.doc
    }

    /// Pretty-printed JSON for the deployment engine.
    pub fn to_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.doc)
    }

    /// The resource entry for a logical id.
    pub fn resource(&self, logical_id: &str) -> Option<&Value> {
        self.doc.get("Resources")?.get(logical_id)
    }

    /// Logical ids in construction order.
    pub fn resource_ids(&self) -> Vec<&str> {
        self.doc
            .get("Resources")
            .and_then(Value::as_object)
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Logical ids of every resource of the given type.
    pub fn resources_of_kind(&self, kind: &str) -> Vec<&str> {
        self.doc
            .get("Resources")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter(|(_, entry)| entry.get("Type").and_then(Value::as_str) == Some(kind))
                    .map(|(id, _)| id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The output entry for a name.
    pub fn output(&self, name: &str) -> Option<&Value> {
        self.doc.get("Outputs")?.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::Stack;

    #[test]
    fn test_template_shape() {
        let mut stack = Stack::new("postbox-dev");
        stack.set_description("Postbox main stack");
        let vpc = stack
            .add_resource("vpc", "AWS::EC2::VPC", json!({ "CidrBlock": "10.0.0.0/16" }))
            .unwrap();
        stack.add_output("VpcId", vpc.reference());

        let template = stack.synth().unwrap();
        let doc = template.as_value();
        assert_eq!(doc["AWSTemplateFormatVersion"], "2010-09-09");
        assert_eq!(doc["Description"], "Postbox main stack");
        assert_eq!(
            doc["Resources"]["PostboxDevVpc"]["Properties"]["CidrBlock"],
            "10.0.0.0/16"
        );
        assert_eq!(doc["Outputs"]["VpcId"]["Value"], json!({ "Ref": "PostboxDevVpc" }));
    }

    #[test]
    fn test_depends_on_is_emitted() {
        let mut stack = Stack::new("postbox-dev");
        let base = stack
            .add_resource("base", "Test::Base", json!({}))
            .unwrap();
        stack
            .add_resource_with_dependencies("dep", "Test::Dep", json!({}), &[&base])
            .unwrap();

        let template = stack.synth().unwrap();
        assert_eq!(
            template.resource("PostboxDevDep").unwrap()["DependsOn"],
            json!(["PostboxDevBase"])
        );
    }
}
