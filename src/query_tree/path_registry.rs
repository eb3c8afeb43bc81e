//! Per-compile cache of resolved navigation positions.

use std::collections::HashMap;

use super::navigable_path::NavigablePath;
use super::node::NodeId;

/// Maps each [`NavigablePath`] to the one node that represents it.
#[derive(Debug, Clone, Default)]
pub struct PathRegistry {
    paths: HashMap<NavigablePath, NodeId>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached node for `path`, or build one with `factory` and cache it.
    ///
    /// The factory runs only on a miss; a failed factory leaves the registry untouched.
    pub fn resolve<E, F>(&mut self, path: &NavigablePath, factory: F) -> Result<NodeId, E>
    where
        F: FnOnce() -> Result<NodeId, E>,
    {
        if let Some(id) = self.paths.get(path) {
            log::trace!("Path registry hit for `{}`", path);
            return Ok(*id);
        }
        let id = factory()?;
        self.paths.insert(path.clone(), id);
        Ok(id)
    }

    pub fn find(&self, path: &NavigablePath) -> Option<NodeId> {
        self.paths.get(path).copied()
    }

    pub fn contains(&self, path: &NavigablePath) -> bool {
        self.paths.contains_key(path)
    }

    /// Record a node created outside [`resolve`](Self::resolve). The first registration wins.
    pub(crate) fn register(&mut self, path: NavigablePath, id: NodeId) {
        self.paths.entry(path).or_insert(id);
    }

    /// First free path under `parent` for `segment`: the plain segment, then
    /// `segment#2`, `segment#3`, ...
    pub fn next_free_path(&self, parent: &NavigablePath, segment: &str) -> NavigablePath {
        let candidate = parent.append(segment);
        if !self.contains(&candidate) {
            return candidate;
        }
        (2usize..)
            .map(|ordinal| parent.append(format!("{}#{}", segment, ordinal)))
            .find(|path| !self.contains(path))
            .unwrap_or(candidate)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
