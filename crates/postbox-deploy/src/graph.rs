//! Construction-order computation over the resource reference graph.
//!
//! Uses `petgraph` to model `Ref`/`Fn::GetAtt` edges (plus explicit
//! `DependsOn`) as a directed graph. Topological sort both detects cycles
//! and yields the order in which the deployment engine must materialize
//! the resources.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use serde_json::Value;

use crate::stack::{DeployError, Resource};

/// Compute the construction order as indices into `resources`.
///
/// Edges run from a referenced resource to its referent. Unknown targets
/// and cycles are errors.
pub fn construction_order(resources: &[Resource]) -> Result<Vec<usize>, DeployError> {
    let id_to_idx: HashMap<&str, usize> = resources
        .iter()
        .enumerate()
        .map(|(i, r)| (r.logical_id.as_str(), i))
        .collect();

    let mut graph = DiGraph::<usize, ()>::new();
    let node_indices: Vec<_> = resources
        .iter()
        .enumerate()
        .map(|(i, _)| graph.add_node(i))
        .collect();

    for (idx, resource) in resources.iter().enumerate() {
        let mut targets = Vec::new();
        collect_references(&resource.properties, &mut targets);
        targets.extend(resource.depends_on.iter().cloned());

        for target in targets {
            let from_idx = id_to_idx.get(target.as_str()).ok_or_else(|| {
                DeployError::UnknownReference(resource.logical_id.clone(), target.clone())
            })?;
            graph.add_edge(node_indices[*from_idx], node_indices[idx], ());
        }
    }

    let sorted = toposort(&graph, None).map_err(|cycle| {
        let idx = graph[cycle.node_id()];
        DeployError::DependencyCycle(resources[idx].logical_id.clone())
    })?;

    Ok(sorted.into_iter().map(|n| graph[n]).collect())
}

/// Collect the logical ids referenced by `Ref` and `Fn::GetAtt` nodes
/// anywhere inside a property tree.
pub fn collect_references(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(Value::String(target)) = map.get("Ref") {
                    out.push(target.clone());
                    return;
                }
                if let Some(Value::Array(parts)) = map.get("Fn::GetAtt") {
                    if let Some(Value::String(target)) = parts.first() {
                        out.push(target.clone());
                        return;
                    }
                }
            }
            for nested in map.values() {
                collect_references(nested, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(id: &str, properties: Value) -> Resource {
        Resource {
            logical_id: id.to_string(),
            kind: "Test::Resource".to_string(),
            properties,
            depends_on: Vec::new(),
        }
    }

    #[test]
    fn test_collect_references_finds_nested_refs() {
        let properties = json!({
            "VpcId": { "Ref": "Vpc" },
            "Tags": [{ "Key": "Name", "Value": "x" }],
            "Uri": { "Fn::Join": ["", ["prefix", { "Fn::GetAtt": ["Fn", "Arn"] }]] },
        });
        let mut refs = Vec::new();
        collect_references(&properties, &mut refs);
        refs.sort();
        assert_eq!(refs, vec!["Fn", "Vpc"]);
    }

    #[test]
    fn test_order_respects_references() {
        let resources = vec![
            resource("C", json!({ "Target": { "Ref": "B" } })),
            resource("B", json!({ "Target": { "Ref": "A" } })),
            resource("A", json!({})),
        ];
        let order = construction_order(&resources).unwrap();
        let pos = |id: &str| {
            order
                .iter()
                .position(|&i| resources[i].logical_id == id)
                .unwrap()
        };
        assert!(pos("A") < pos("B"));
        assert!(pos("B") < pos("C"));
    }

    #[test]
    fn test_cycle_is_detected() {
        let resources = vec![
            resource("A", json!({ "Target": { "Ref": "B" } })),
            resource("B", json!({ "Target": { "Ref": "A" } })),
        ];
        assert!(matches!(
            construction_order(&resources),
            Err(DeployError::DependencyCycle(_))
        ));
    }

    #[test]
    fn test_explicit_depends_on_creates_edge() {
        let mut dependent = resource("Dependent", json!({}));
        dependent.depends_on.push("Base".to_string());
        let resources = vec![dependent, resource("Base", json!({}))];
        let order = construction_order(&resources).unwrap();
        assert_eq!(resources[order[0]].logical_id, "Base");
    }
}
