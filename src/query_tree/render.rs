//! Canonical text rendering of a query tree.
//!
//! Nodes without an explicit alias render as `<prefix><node index>`; the
//! index is the node's position in its arena, so placeholders are unique and
//! stable for the tree they were rendered from. Explicit aliases of that form
//! are rejected at build time, so rendering with the configured prefix never
//! repeats an alias.

use std::borrow::Cow;

use super::node::{JoinSource, NodeId, NodeKind, QueryTree};

pub struct TreeRenderer<'t> {
    tree: &'t QueryTree,
    alias_prefix: &'t str,
}

impl<'t> TreeRenderer<'t> {
    pub fn new(tree: &'t QueryTree, alias_prefix: &'t str) -> Self {
        TreeRenderer { tree, alias_prefix }
    }

    /// Explicit alias of `id`, or a synthesized placeholder.
    pub fn render_canonical(&self, id: NodeId) -> Cow<'t, str> {
        match self.tree.node(id).explicit_alias() {
            Some(alias) => Cow::Borrowed(alias),
            None => Cow::Owned(format!("{}{}", self.alias_prefix, id.index())),
        }
    }

    /// How `id` is referenced as the left-hand side of a join.
    ///
    /// Treats never enter the from-clause on their own, so even an aliased
    /// treat is spelled out in full.
    pub fn render_reference(&self, id: NodeId) -> String {
        let node = self.tree.node(id);
        match (node.kind(), node.parent()) {
            (NodeKind::Treat { target_type }, Some(parent)) => {
                format!("treat({} as {})", self.render_reference(parent), target_type)
            }
            (NodeKind::Path { attribute, .. }, Some(parent)) => {
                format!("{}.{}", self.render_reference(parent), attribute)
            }
            _ => self.render_canonical(id).into_owned(),
        }
    }

    /// Declaration-order from-clause, driven by the root's join ledger.
    ///
    /// ```text
    /// from Person e join e.manager alias_1 left join fetch e.orders o
    /// ```
    pub fn render_from_clause(&self) -> String {
        let root = self.tree.root();
        let mut out = format!(
            "from {} {}",
            self.tree.node(root).referenced_type(),
            self.render_canonical(root)
        );

        for join in self.tree.join_ledger() {
            let node = self.tree.node(*join);
            let (Some(data), Some(parent)) = (node.join_data(), node.parent()) else {
                continue;
            };
            out.push(' ');
            out.push_str(data.join_type.as_hql());
            if data.fetched {
                out.push_str(" fetch");
            }
            match &data.source {
                JoinSource::Attribute { name, .. } => {
                    out.push_str(&format!(" {}.{}", self.render_reference(parent), name));
                }
                JoinSource::Entity { entity_name } => {
                    out.push_str(&format!(" {}", entity_name));
                }
            }
            out.push(' ');
            out.push_str(&self.render_canonical(*join));
        }
        out
    }
}

impl QueryTree {
    pub fn render_canonical(&self, id: NodeId, alias_prefix: &str) -> String {
        TreeRenderer::new(self, alias_prefix)
            .render_canonical(id)
            .into_owned()
    }

    pub fn render_from_clause(&self, alias_prefix: &str) -> String {
        TreeRenderer::new(self, alias_prefix).render_from_clause()
    }
}
