//! Query tree build context.
//!
//! [`BuildCtx`] is the state of one query compile. It owns the tree under
//! construction, the [`PathRegistry`] and the alias table, and borrows the
//! [`DomainModel`]. Every mutation of the tree goes through one of its
//! methods, so each place that touches the Root Join Ledger is visible here.
//!
//! # Operations
//!
//! - Navigation: [`resolve_path_part`](BuildCtx::resolve_path_part)
//! - Joins: [`join`](BuildCtx::join), [`join_attribute`](BuildCtx::join_attribute),
//!   the name-based collection joins and [`join_entity`](BuildCtx::join_entity)
//! - Fetches: [`fetch`](BuildCtx::fetch), [`fetch_attribute`](BuildCtx::fetch_attribute)
//! - Treats: [`treat_as`](BuildCtx::treat_as) (find-then-add), [`add_treat`](BuildCtx::add_treat)
//! - Aliases: [`alias`](BuildCtx::alias)
//!
//! A failed operation leaves the tree, the registry and the ledger exactly as
//! they were: all checks run before any node is allocated.

use std::collections::HashMap;

use super::errors::QueryTreeError;
use super::join_dispatch;
use super::navigable_path::{entity_join_segment, treat_segment};
use super::node::{JoinData, JoinSource, JoinType, NodeId, NodeKind, QueryTree};
use super::path_registry::PathRegistry;
use crate::config::BuilderConfig;
use crate::domain_model::{AttributeDescriptor, AttributeKind, DomainModel};
use crate::utils::identifier::is_identifier;

#[derive(Debug)]
pub struct BuildCtx<'m> {
    model: &'m DomainModel,
    config: BuilderConfig,
    tree: QueryTree,
    registry: PathRegistry,
    /// explicit alias -> node carrying it
    aliases: HashMap<String, NodeId>,
}

impl<'m> BuildCtx<'m> {
    /// Start a compile rooted at `entity`, with the default configuration.
    pub fn new(
        model: &'m DomainModel,
        entity: &str,
        alias: Option<&str>,
    ) -> Result<Self, QueryTreeError> {
        Self::with_config(model, BuilderConfig::default(), entity, alias)
    }

    pub fn with_config(
        model: &'m DomainModel,
        config: BuilderConfig,
        entity: &str,
        alias: Option<&str>,
    ) -> Result<Self, QueryTreeError> {
        let root_type = model
            .entity(entity)
            .ok_or_else(|| QueryTreeError::UnknownEntity {
                entity: entity.to_string(),
            })?;
        if let Some(alias) = alias {
            check_alias_syntax(alias, &config.alias_prefix)?;
        }

        // the root path is seeded by the alias when there is one, else by the canonical entity name
        let segment = alias.unwrap_or(&root_type.name);
        let tree = QueryTree::new(&root_type.name, segment, alias.map(str::to_string));
        let root = tree.root();

        let mut registry = PathRegistry::new();
        registry.register(tree.node(root).path().clone(), root);
        let mut aliases = HashMap::new();
        if let Some(alias) = alias {
            aliases.insert(alias.to_string(), root);
        }

        log::debug!("Starting query tree at `{}` ({})", segment, root_type.name);
        Ok(BuildCtx {
            model,
            config,
            tree,
            registry,
            aliases,
        })
    }

    pub fn tree(&self) -> &QueryTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn model(&self) -> &'m DomainModel {
        self.model
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn registry(&self) -> &PathRegistry {
        &self.registry
    }

    /// Node carrying the explicit alias `alias`, if any.
    pub fn find_by_alias(&self, alias: &str) -> Option<NodeId> {
        self.aliases.get(alias).copied()
    }

    /// End the compile pass; the returned tree is no longer mutable.
    pub fn finish(self) -> QueryTree {
        log::debug!(
            "Finished query tree: {} nodes, {} ledger entries",
            self.tree.len(),
            self.tree.join_ledger().len()
        );
        self.tree
    }

    fn full_path(&self, id: NodeId) -> String {
        self.tree.node(id).path().full_path()
    }

    fn find_attribute(
        &self,
        from: NodeId,
        name: &str,
    ) -> Result<AttributeDescriptor, QueryTreeError> {
        let node = self.tree.node(from);
        self.model
            .find_attribute(node.referenced_type(), name)
            .ok_or_else(|| QueryTreeError::UnknownPath {
                path: node.path().full_path(),
                segment: name.to_string(),
            })
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Resolve one navigation step from `from`.
    ///
    /// Returns the node already registered for `from.name` when there is one
    /// (including a join created earlier on that attribute); otherwise creates
    /// a simple path node for the attribute.
    pub fn resolve_path_part(
        &mut self,
        from: NodeId,
        name: &str,
    ) -> Result<NodeId, QueryTreeError> {
        let path = self.tree.node(from).path().append(name);
        let BuildCtx {
            model,
            tree,
            registry,
            ..
        } = self;

        registry.resolve(&path, || {
            let node = tree.node(from);
            let attribute = model
                .find_attribute(node.referenced_type(), name)
                .ok_or_else(|| QueryTreeError::UnknownPath {
                    path: node.path().full_path(),
                    segment: name.to_string(),
                })?;
            log::trace!("Creating path node `{}`", path);
            Ok(tree.push_node(
                from,
                path.clone(),
                attribute.target_type,
                None,
                NodeKind::Path {
                    attribute: attribute.name,
                    attribute_kind: attribute.kind,
                },
            ))
        })
    }

    // ========================================================================
    // Joins and fetches
    // ========================================================================

    /// Build a join (or fetch) node for `attribute` under `from`.
    ///
    /// The node is appended to `from`'s joins and to the root's ledger in the
    /// same step it is created.
    pub fn build_join(
        &mut self,
        from: NodeId,
        attribute: &AttributeDescriptor,
        join_type: JoinType,
        fetched: bool,
    ) -> Result<NodeId, QueryTreeError> {
        let owner_path = self.full_path(from);
        let owner_type = self.tree.node(from).referenced_type();
        if !self.model.is_subtype(owner_type, &attribute.declaring_type) {
            return Err(QueryTreeError::AttributeNotMember {
                attribute: attribute.name.clone(),
                declaring_type: attribute.declaring_type.clone(),
                path: owner_path,
            });
        }
        let shape = join_dispatch::classify(attribute, &owner_path)?;

        let path = self
            .registry
            .next_free_path(self.tree.node(from).path(), &attribute.name);
        let id = self.tree.push_node(
            from,
            path.clone(),
            attribute.target_type.clone(),
            None,
            NodeKind::Join(JoinData {
                join_type,
                fetched,
                source: JoinSource::Attribute {
                    name: attribute.name.clone(),
                    shape,
                },
            }),
        );
        self.tree.attach_join(from, id);
        log::debug!(
            "{} `{}` ({:?}, {} of {})",
            if fetched { "Fetch" } else { "Join" },
            path,
            join_type,
            attribute.kind,
            attribute.target_type
        );
        self.registry.register(path, id);
        Ok(id)
    }

    pub fn join(
        &mut self,
        from: NodeId,
        name: &str,
        join_type: JoinType,
    ) -> Result<NodeId, QueryTreeError> {
        let attribute = self.find_attribute(from, name)?;
        self.build_join(from, &attribute, join_type, false)
    }

    /// [`join`](Self::join) with the configured default join type.
    pub fn join_default(&mut self, from: NodeId, name: &str) -> Result<NodeId, QueryTreeError> {
        self.join(from, name, self.config.default_join_type)
    }

    pub fn join_attribute(
        &mut self,
        from: NodeId,
        attribute: &AttributeDescriptor,
        join_type: JoinType,
    ) -> Result<NodeId, QueryTreeError> {
        self.build_join(from, attribute, join_type, false)
    }

    fn join_expecting(
        &mut self,
        from: NodeId,
        name: &str,
        expected: AttributeKind,
        join_type: JoinType,
    ) -> Result<NodeId, QueryTreeError> {
        let attribute = self.find_attribute(from, name)?;
        join_dispatch::expect_kind(&attribute, expected, &self.full_path(from))?;
        self.build_join(from, &attribute, join_type, false)
    }

    /// Join a bag attribute by name; any other shape is a `KindMismatch`.
    pub fn join_collection(
        &mut self,
        from: NodeId,
        name: &str,
        join_type: JoinType,
    ) -> Result<NodeId, QueryTreeError> {
        self.join_expecting(from, name, AttributeKind::Bag, join_type)
    }

    pub fn join_set(
        &mut self,
        from: NodeId,
        name: &str,
        join_type: JoinType,
    ) -> Result<NodeId, QueryTreeError> {
        self.join_expecting(from, name, AttributeKind::Set, join_type)
    }

    pub fn join_list(
        &mut self,
        from: NodeId,
        name: &str,
        join_type: JoinType,
    ) -> Result<NodeId, QueryTreeError> {
        self.join_expecting(from, name, AttributeKind::List, join_type)
    }

    pub fn join_map(
        &mut self,
        from: NodeId,
        name: &str,
        join_type: JoinType,
    ) -> Result<NodeId, QueryTreeError> {
        self.join_expecting(from, name, AttributeKind::Map, join_type)
    }

    pub fn fetch(
        &mut self,
        from: NodeId,
        name: &str,
        join_type: JoinType,
    ) -> Result<NodeId, QueryTreeError> {
        let attribute = self.find_attribute(from, name)?;
        self.build_join(from, &attribute, join_type, true)
    }

    /// [`fetch`](Self::fetch) with the configured default join type.
    pub fn fetch_default(&mut self, from: NodeId, name: &str) -> Result<NodeId, QueryTreeError> {
        self.fetch(from, name, self.config.default_join_type)
    }

    pub fn fetch_attribute(
        &mut self,
        from: NodeId,
        attribute: &AttributeDescriptor,
        join_type: JoinType,
    ) -> Result<NodeId, QueryTreeError> {
        self.build_join(from, attribute, join_type, true)
    }

    /// Join an entity that is not reached through an attribute of `from`.
    ///
    /// The path segment is synthesized (`join(Entity)`, then `join(Entity)#2`, ...).
    pub fn join_entity(
        &mut self,
        from: NodeId,
        entity: &str,
        join_type: JoinType,
    ) -> Result<NodeId, QueryTreeError> {
        let entity_type = self
            .model
            .entity(entity)
            .ok_or_else(|| QueryTreeError::UnknownEntity {
                entity: entity.to_string(),
            })?;

        let path = self
            .registry
            .next_free_path(self.tree.node(from).path(), &entity_join_segment(&entity_type.name));
        let id = self.tree.push_node(
            from,
            path.clone(),
            entity_type.name.clone(),
            None,
            NodeKind::Join(JoinData {
                join_type,
                fetched: false,
                source: JoinSource::Entity {
                    entity_name: entity_type.name.clone(),
                },
            }),
        );
        self.tree.attach_join(from, id);
        log::debug!("Entity join `{}` ({:?})", path, join_type);
        self.registry.register(path, id);
        Ok(id)
    }

    // ========================================================================
    // Treats
    // ========================================================================

    /// Existing treat of `from` for (`target_type`, `alias`).
    pub fn find_treat(
        &self,
        from: NodeId,
        target_type: &str,
        alias: Option<&str>,
    ) -> Option<NodeId> {
        self.tree.find_treat(from, target_type, alias)
    }

    /// Narrow `from` to `target_type`, reusing a matching treat when one exists.
    pub fn treat_as(
        &mut self,
        from: NodeId,
        target_type: &str,
        alias: Option<&str>,
    ) -> Result<NodeId, QueryTreeError> {
        if let Some(existing) = self.find_treat(from, target_type, alias) {
            log::trace!("Reusing treat {} of `{}`", existing, self.full_path(from));
            return Ok(existing);
        }
        self.add_treat(from, target_type, alias)
    }

    /// Create a treat node under `from` without looking for an existing one.
    ///
    /// Callers that want one node per (type, alias) use [`treat_as`](Self::treat_as).
    pub fn add_treat(
        &mut self,
        from: NodeId,
        target_type: &str,
        alias: Option<&str>,
    ) -> Result<NodeId, QueryTreeError> {
        let node = self.tree.node(from);
        let target = self
            .model
            .entity(target_type)
            .ok_or_else(|| QueryTreeError::UnknownEntity {
                entity: target_type.to_string(),
            })?;
        if !self.model.is_subtype(&target.name, node.referenced_type()) {
            return Err(QueryTreeError::InvalidTreatTarget {
                path: node.path().full_path(),
                referenced_type: node.referenced_type().to_string(),
                target: target.name.clone(),
            });
        }
        if let Some(alias) = alias {
            self.check_alias_available(alias)?;
        }

        let path = self
            .registry
            .next_free_path(node.path(), &treat_segment(&target.name));
        let id = self.tree.push_node(
            from,
            path.clone(),
            target.name.clone(),
            alias.map(str::to_string),
            NodeKind::Treat {
                target_type: target.name.clone(),
            },
        );
        self.tree.add_treat(from, id);
        self.registry.register(path, id);
        if let Some(alias) = alias {
            self.aliases.insert(alias.to_string(), id);
        }
        log::debug!("Treat `{}`", self.full_path(id));
        Ok(id)
    }

    // ========================================================================
    // Aliases
    // ========================================================================

    /// Give `id` an explicit alias; a node that already has one keeps it.
    pub fn alias(&mut self, id: NodeId, name: &str) -> Result<(), QueryTreeError> {
        let node = self.tree.node(id);
        if node.explicit_alias().is_some() {
            return Ok(());
        }
        if !self.config.allow_aliased_plural_fetch
            && node.is_fetched()
            && node
                .join_data()
                .and_then(|j| j.attribute_kind())
                .is_some_and(|kind| kind.is_plural())
        {
            return Err(QueryTreeError::AliasedPluralFetch {
                path: node.path().full_path(),
            });
        }
        self.check_alias_available(name)?;

        self.tree.set_explicit_alias(id, name.to_string());
        self.aliases.insert(name.to_string(), id);
        Ok(())
    }

    fn check_alias_available(&self, alias: &str) -> Result<(), QueryTreeError> {
        check_alias_syntax(alias, &self.config.alias_prefix)?;
        match self.aliases.get(alias) {
            Some(owner) => Err(QueryTreeError::DuplicateAlias {
                alias: alias.to_string(),
                path: self.full_path(*owner),
            }),
            None => Ok(()),
        }
    }
}

/// Aliases must be identifiers and stay clear of the `<prefix><n>` placeholders.
fn check_alias_syntax(alias: &str, placeholder_prefix: &str) -> Result<(), QueryTreeError> {
    if !is_identifier(alias) {
        return Err(QueryTreeError::InvalidAlias {
            alias: alias.to_string(),
        });
    }
    let reserved = alias
        .strip_prefix(placeholder_prefix)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()));
    if reserved {
        return Err(QueryTreeError::ReservedAlias {
            alias: alias.to_string(),
            prefix: placeholder_prefix.to_string(),
        });
    }
    Ok(())
}
