//! Expression nodes and the arena that owns them.
//!
//! A [`QueryTree`] is an arena of [`ExpressionNode`]s addressed by [`NodeId`].
//! Parent links and the root back-reference are plain ids, so the whole tree
//! is allocated and dropped as one unit with no reference counting.
//!
//! # Node Kinds
//!
//! - **Root**: the tree's starting entity; owns the Root Join Ledger
//! - **Path**: a simple attribute navigation (no new table reference)
//! - **Join**: attribute join or ad-hoc entity join; a fetch is a join with `fetched = true`
//! - **Treat**: type narrowing of the parent; never enters the ledger

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::errors::QueryTreeError;
use super::navigable_path::NavigablePath;
use crate::domain_model::AttributeKind;

/// Index of a node inside its [`QueryTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        NodeId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    /// Keyword sequence used when rendering the from-clause.
    pub fn as_hql(&self) -> &'static str {
        match self {
            JoinType::Inner => "join",
            JoinType::Left => "left join",
            JoinType::Right => "right join",
            JoinType::Full => "full join",
            JoinType::Cross => "cross join",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Unknown join type `{0}` (expected inner, left, right, full or cross)")]
pub struct ParseJoinTypeError(String);

impl FromStr for JoinType {
    type Err = ParseJoinTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inner" => Ok(JoinType::Inner),
            "left" => Ok(JoinType::Left),
            "right" => Ok(JoinType::Right),
            "full" => Ok(JoinType::Full),
            "cross" => Ok(JoinType::Cross),
            _ => Err(ParseJoinTypeError(s.to_string())),
        }
    }
}

/// Shape of an attribute join, one per [`AttributeKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinShape {
    Singular,
    Bag,
    List,
    Set,
    /// Map joins keep the key type apart from the value (target) type
    Map { key_type: String },
}

impl JoinShape {
    pub fn attribute_kind(&self) -> AttributeKind {
        match self {
            JoinShape::Singular => AttributeKind::Singular,
            JoinShape::Bag => AttributeKind::Bag,
            JoinShape::List => AttributeKind::List,
            JoinShape::Set => AttributeKind::Set,
            JoinShape::Map { .. } => AttributeKind::Map,
        }
    }
}

/// Where a join comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinSource {
    Attribute { name: String, shape: JoinShape },
    /// Ad-hoc join to an unrelated entity; no parent attribute
    Entity { entity_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinData {
    pub join_type: JoinType,
    pub fetched: bool,
    pub source: JoinSource,
}

impl JoinData {
    pub fn attribute_kind(&self) -> Option<AttributeKind> {
        match &self.source {
            JoinSource::Attribute { shape, .. } => Some(shape.attribute_kind()),
            JoinSource::Entity { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root {
        entity_name: String,
        /// Every join/fetch in the tree, in creation order
        join_ledger: Vec<NodeId>,
    },
    Path {
        attribute: String,
        attribute_kind: AttributeKind,
    },
    Join(JoinData),
    Treat {
        target_type: String,
    },
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Root { .. } => "root",
            NodeKind::Path { .. } => "path",
            NodeKind::Join(JoinData {
                source: JoinSource::Entity { .. },
                ..
            }) => "entity_join",
            NodeKind::Join(JoinData { fetched: true, .. }) => "fetch",
            NodeKind::Join(_) => "join",
            NodeKind::Treat { .. } => "treat",
        }
    }
}

/// One position in the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionNode {
    id: NodeId,
    path: NavigablePath,
    referenced_type: String,
    parent: Option<NodeId>,
    root: NodeId,
    explicit_alias: Option<String>,
    joins: Vec<NodeId>,
    treats: Vec<NodeId>,
    kind: NodeKind,
}

impl ExpressionNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn path(&self) -> &NavigablePath {
        &self.path
    }

    /// Type this node yields (target type for joins, narrowed type for treats).
    pub fn referenced_type(&self) -> &str {
        &self.referenced_type
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn explicit_alias(&self) -> Option<&str> {
        self.explicit_alias.as_deref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn join_data(&self) -> Option<&JoinData> {
        match &self.kind {
            NodeKind::Join(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_join(&self) -> bool {
        self.join_data().is_some()
    }

    pub fn is_fetched(&self) -> bool {
        self.join_data().is_some_and(|j| j.fetched)
    }

    pub fn is_treat(&self) -> bool {
        matches!(self.kind, NodeKind::Treat { .. })
    }

    /// Target type of a treat node.
    pub fn treat_target(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Treat { target_type } => Some(target_type),
            _ => None,
        }
    }
}

/// The finished (or in-construction) navigation tree of one query compile.
#[derive(Debug, Clone)]
pub struct QueryTree {
    nodes: Vec<ExpressionNode>,
    root: NodeId,
}

impl QueryTree {
    pub(crate) fn new(entity_name: &str, root_segment: &str, alias: Option<String>) -> Self {
        let root = NodeId::new(0);
        QueryTree {
            nodes: vec![ExpressionNode {
                id: root,
                path: NavigablePath::root(root_segment),
                referenced_type: entity_name.to_string(),
                parent: None,
                root,
                explicit_alias: alias,
                joins: vec![],
                treats: vec![],
                kind: NodeKind::Root {
                    entity_name: entity_name.to_string(),
                    join_ledger: vec![],
                },
            }],
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node by id.
    ///
    /// Ids are only issued by the tree that owns them; passing an id from a
    /// different tree panics when it is out of range.
    pub fn node(&self, id: NodeId) -> &ExpressionNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&ExpressionNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &ExpressionNode> {
        self.nodes.iter()
    }

    /// The root's ledger of every join and fetch, in global creation order.
    pub fn join_ledger(&self) -> &[NodeId] {
        match &self.node(self.root).kind {
            NodeKind::Root { join_ledger, .. } => join_ledger.as_slice(),
            _ => &[],
        }
    }

    pub fn has_joins(&self, id: NodeId) -> bool {
        !self.node(id).joins.is_empty()
    }

    /// Every direct join child, joins and fetches alike, in creation order.
    pub fn sqm_joins(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).joins
    }

    /// Direct children that are plain joins (`fetched == false`).
    pub fn joins(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .joins
            .iter()
            .copied()
            .filter(|child| !self.node(*child).is_fetched())
            .collect()
    }

    /// Direct children that are fetches (`fetched == true`).
    pub fn fetches(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .joins
            .iter()
            .copied()
            .filter(|child| self.node(*child).is_fetched())
            .collect()
    }

    pub fn has_treats(&self, id: NodeId) -> bool {
        !self.node(id).treats.is_empty()
    }

    pub fn treats(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).treats
    }

    /// Existing treat of `id` matching `target_type` and `alias` (both unset, or equal).
    pub fn find_treat(&self, id: NodeId, target_type: &str, alias: Option<&str>) -> Option<NodeId> {
        self.node(id).treats.iter().copied().find(|treat| {
            let treat = self.node(*treat);
            treat.treat_target() == Some(target_type) && treat.explicit_alias() == alias
        })
    }

    /// The navigation parent, if any.
    pub fn parent_path(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn find_by_alias(&self, alias: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.explicit_alias() == Some(alias))
            .map(|n| n.id)
    }

    /// Nodes in this tree are never correlated; only subquery roots are.
    pub fn is_correlated(&self, _id: NodeId) -> bool {
        false
    }

    pub fn correlation_parent(&self, id: NodeId) -> Result<NodeId, QueryTreeError> {
        Err(QueryTreeError::NotCorrelated {
            path: self.node(id).path.full_path(),
        })
    }

    // ========================================================================
    // Construction (only reachable through BuildCtx)
    // ========================================================================

    pub(crate) fn push_node(
        &mut self,
        parent: NodeId,
        path: NavigablePath,
        referenced_type: String,
        explicit_alias: Option<String>,
        kind: NodeKind,
    ) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        let root = self.node(parent).root;
        self.nodes.push(ExpressionNode {
            id,
            path,
            referenced_type,
            parent: Some(parent),
            root,
            explicit_alias,
            joins: vec![],
            treats: vec![],
            kind,
        });
        id
    }

    /// Append `join` to its parent's joins and to the root's ledger.
    pub(crate) fn attach_join(&mut self, parent: NodeId, join: NodeId) {
        self.nodes[parent.0].joins.push(join);
        let root = self.node(parent).root;
        if let NodeKind::Root { join_ledger, .. } = &mut self.nodes[root.0].kind {
            join_ledger.push(join);
        }
    }

    /// Append unconditionally; callers deduplicate via [`find_treat`](Self::find_treat).
    pub(crate) fn add_treat(&mut self, parent: NodeId, treat: NodeId) {
        self.nodes[parent.0].treats.push(treat);
    }

    pub(crate) fn set_explicit_alias(&mut self, id: NodeId, alias: String) {
        self.nodes[id.0].explicit_alias = Some(alias);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_children() -> (QueryTree, NodeId, NodeId, NodeId) {
        let mut tree = QueryTree::new("Person", "e", Some("e".to_string()));
        let root = tree.root();
        let join = tree.push_node(
            root,
            NavigablePath::root("e").append("manager"),
            "Person".to_string(),
            None,
            NodeKind::Join(JoinData {
                join_type: JoinType::Inner,
                fetched: false,
                source: JoinSource::Attribute {
                    name: "manager".to_string(),
                    shape: JoinShape::Singular,
                },
            }),
        );
        tree.attach_join(root, join);
        let fetch = tree.push_node(
            join,
            NavigablePath::root("e").append("manager").append("orders"),
            "Order".to_string(),
            None,
            NodeKind::Join(JoinData {
                join_type: JoinType::Left,
                fetched: true,
                source: JoinSource::Attribute {
                    name: "orders".to_string(),
                    shape: JoinShape::Bag,
                },
            }),
        );
        tree.attach_join(join, fetch);
        (tree, root, join, fetch)
    }

    #[test]
    fn test_attach_join_feeds_root_ledger() {
        let (tree, root, join, fetch) = tree_with_children();
        assert_eq!(tree.join_ledger(), &[join, fetch]);
        assert_eq!(tree.sqm_joins(root), &[join]);
        assert_eq!(tree.sqm_joins(join), &[fetch]);
        assert_eq!(tree.node(fetch).root(), root);
    }

    #[test]
    fn test_join_and_fetch_views() {
        let (tree, root, join, fetch) = tree_with_children();
        assert_eq!(tree.joins(root), vec![join]);
        assert!(tree.fetches(root).is_empty());
        assert_eq!(tree.fetches(join), vec![fetch]);
        assert!(tree.joins(join).is_empty());
        assert_eq!(tree.node(fetch).kind().label(), "fetch");
    }

    #[test]
    fn test_correlation_is_rejected() {
        let (tree, root, _, _) = tree_with_children();
        assert!(!tree.is_correlated(root));
        assert_eq!(
            tree.correlation_parent(root),
            Err(QueryTreeError::NotCorrelated {
                path: "e".to_string()
            })
        );
    }

    #[test]
    fn test_join_type_parsing() {
        assert_eq!("LEFT".parse::<JoinType>(), Ok(JoinType::Left));
        assert_eq!(" cross ".parse::<JoinType>(), Ok(JoinType::Cross));
        assert!("outer".parse::<JoinType>().is_err());
        assert_eq!(JoinType::Full.as_hql(), "full join");
    }
}
