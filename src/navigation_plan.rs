//! Navigation plans: already-parsed navigation steps loaded from YAML.
//!
//! A plan names a root entity and a list of steps. Steps refer to earlier
//! positions by alias (`from: e`); a step that carries `alias` makes its
//! node addressable by later steps. A root without an alias is addressed by
//! its entity name.
//!
//! ```yaml
//! root: { entity: Person, alias: e }
//! steps:
//!   - join: { from: e, attribute: manager, alias: m, join_type: left }
//!   - fetch: { from: m, attribute: orders }
//!   - join_set: { from: e, attribute: friends }
//!   - treat: { from: m, target: Manager, alias: mm }
//!   - entity_join: { from: e, entity: Country, join_type: cross }
//!   - path: { from: e, attribute: address, alias: addr }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BuilderConfig;
use crate::domain_model::DomainModel;
use crate::query_tree::{BuildCtx, JoinType, NodeId, QueryTree, QueryTreeError};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NavigationPlanError {
    #[error("Step {step}: no node is aliased `{alias}`")]
    UnknownAlias { step: usize, alias: String },
    #[error("Step {step}: {source}")]
    Step {
        step: usize,
        #[source]
        source: QueryTreeError,
    },
    #[error(transparent)]
    Root(#[from] QueryTreeError),
    #[error("Failed to read navigation plan: {error}")]
    ReadError { error: String },
    #[error("Failed to parse navigation plan: {error}")]
    ParseError { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRoot {
    pub entity: String,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeStep {
    pub from: String,
    pub attribute: String,
    #[serde(default)]
    pub alias: Option<String>,
    /// Falls back to the configured default join type
    #[serde(default)]
    pub join_type: Option<JoinType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatStep {
    pub from: String,
    pub target: String,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityJoinStep {
    pub from: String,
    pub entity: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub join_type: Option<JoinType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationStep {
    Path(AttributeStep),
    Join(AttributeStep),
    JoinCollection(AttributeStep),
    JoinList(AttributeStep),
    JoinSet(AttributeStep),
    JoinMap(AttributeStep),
    Fetch(AttributeStep),
    Treat(TreatStep),
    EntityJoin(EntityJoinStep),
}

impl NavigationStep {
    fn from_alias(&self) -> &str {
        match self {
            NavigationStep::Path(s)
            | NavigationStep::Join(s)
            | NavigationStep::JoinCollection(s)
            | NavigationStep::JoinList(s)
            | NavigationStep::JoinSet(s)
            | NavigationStep::JoinMap(s)
            | NavigationStep::Fetch(s) => &s.from,
            NavigationStep::Treat(s) => &s.from,
            NavigationStep::EntityJoin(s) => &s.from,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationPlan {
    pub root: PlanRoot,
    /// Each step is a single-key map (`- join: {...}`), not a YAML tag
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<NavigationStep>,
}

impl NavigationPlan {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, NavigationPlanError> {
        let contents = fs::read_to_string(path).map_err(|e| NavigationPlanError::ReadError {
            error: e.to_string(),
        })?;

        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, NavigationPlanError> {
        serde_yaml::from_str(yaml).map_err(|e| NavigationPlanError::ParseError {
            error: e.to_string(),
        })
    }

    /// Replay the plan in one compile pass and return the finished tree.
    pub fn build(
        &self,
        model: &DomainModel,
        config: BuilderConfig,
    ) -> Result<QueryTree, NavigationPlanError> {
        let mut ctx = BuildCtx::with_config(
            model,
            config,
            &self.root.entity,
            self.root.alias.as_deref(),
        )?;

        for (index, step) in self.steps.iter().enumerate() {
            let step_no = index + 1;
            let from = self.resolve_from(&ctx, step.from_alias()).ok_or_else(|| {
                NavigationPlanError::UnknownAlias {
                    step: step_no,
                    alias: step.from_alias().to_string(),
                }
            })?;
            apply_step(&mut ctx, from, step).map_err(|source| NavigationPlanError::Step {
                step: step_no,
                source,
            })?;
        }

        Ok(ctx.finish())
    }

    /// An unaliased root is addressed by its entity name.
    fn resolve_from(&self, ctx: &BuildCtx<'_>, from: &str) -> Option<NodeId> {
        ctx.find_by_alias(from).or_else(|| {
            (self.root.alias.is_none() && from == self.root.entity).then(|| ctx.root())
        })
    }
}

fn apply_step(
    ctx: &mut BuildCtx<'_>,
    from: NodeId,
    step: &NavigationStep,
) -> Result<NodeId, QueryTreeError> {
    let default_join_type = ctx.config().default_join_type;
    let join_type = |s: &AttributeStep| s.join_type.unwrap_or(default_join_type);

    let (node, alias) = match step {
        NavigationStep::Path(s) => (ctx.resolve_path_part(from, &s.attribute)?, &s.alias),
        NavigationStep::Join(s) => (ctx.join(from, &s.attribute, join_type(s))?, &s.alias),
        NavigationStep::JoinCollection(s) => {
            (ctx.join_collection(from, &s.attribute, join_type(s))?, &s.alias)
        }
        NavigationStep::JoinList(s) => (ctx.join_list(from, &s.attribute, join_type(s))?, &s.alias),
        NavigationStep::JoinSet(s) => (ctx.join_set(from, &s.attribute, join_type(s))?, &s.alias),
        NavigationStep::JoinMap(s) => (ctx.join_map(from, &s.attribute, join_type(s))?, &s.alias),
        NavigationStep::Fetch(s) => (ctx.fetch(from, &s.attribute, join_type(s))?, &s.alias),
        // treat aliases are part of the treat's identity, not set afterwards
        NavigationStep::Treat(s) => return ctx.treat_as(from, &s.target, s.alias.as_deref()),
        NavigationStep::EntityJoin(s) => (
            ctx.join_entity(from, &s.entity, s.join_type.unwrap_or(default_join_type))?,
            &s.alias,
        ),
    };

    if let Some(alias) = alias {
        ctx.alias(node, alias)?;
    }
    Ok(node)
}
