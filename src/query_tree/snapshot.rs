//! Serializable view of a finished tree, handed to SQL generation.

use serde::Serialize;

use super::node::{JoinShape, JoinSource, JoinType, NodeId, NodeKind, QueryTree};
use super::render::TreeRenderer;
use crate::domain_model::AttributeKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub path: String,
    pub referenced_type: String,
    /// Explicit alias, or the synthesized placeholder
    pub alias: String,
    pub explicit_alias: bool,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_type: Option<JoinType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_kind: Option<AttributeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_key_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeSnapshot {
    pub root: NodeId,
    pub from_clause: String,
    pub nodes: Vec<NodeSnapshot>,
    pub join_ledger: Vec<NodeId>,
}

impl QueryTree {
    pub fn snapshot(&self, alias_prefix: &str) -> TreeSnapshot {
        let renderer = TreeRenderer::new(self, alias_prefix);
        let nodes = self
            .iter()
            .map(|node| {
                let join = node.join_data();
                let attribute_kind = match node.kind() {
                    NodeKind::Path { attribute_kind, .. } => Some(*attribute_kind),
                    _ => join.and_then(|j| j.attribute_kind()),
                };
                let map_key_type = match join.map(|j| &j.source) {
                    Some(JoinSource::Attribute {
                        shape: JoinShape::Map { key_type },
                        ..
                    }) => Some(key_type.clone()),
                    _ => None,
                };
                NodeSnapshot {
                    id: node.id(),
                    path: node.path().full_path(),
                    referenced_type: node.referenced_type().to_string(),
                    alias: renderer.render_canonical(node.id()).into_owned(),
                    explicit_alias: node.explicit_alias().is_some(),
                    kind: node.kind().label(),
                    parent: node.parent(),
                    join_type: join.map(|j| j.join_type),
                    fetched: join.map(|j| j.fetched),
                    attribute_kind,
                    map_key_type,
                }
            })
            .collect();

        TreeSnapshot {
            root: self.root(),
            from_clause: renderer.render_from_clause(),
            nodes,
            join_ledger: self.join_ledger().to_vec(),
        }
    }
}
