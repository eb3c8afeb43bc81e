//! Hierarchical path identity for navigation positions.

use std::fmt;
use std::sync::Arc;

/// Canonical identifier of a navigation position: parent path plus one segment.
///
/// Equality and hashing are structural, so two paths built independently from
/// the same parent and segment are interchangeable as registry keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NavigablePath {
    parent: Option<Arc<NavigablePath>>,
    local_name: String,
}

impl NavigablePath {
    pub fn root(local_name: impl Into<String>) -> Self {
        NavigablePath {
            parent: None,
            local_name: local_name.into(),
        }
    }

    pub fn append(&self, segment: impl Into<String>) -> Self {
        NavigablePath {
            parent: Some(Arc::new(self.clone())),
            local_name: segment.into(),
        }
    }

    pub fn parent(&self) -> Option<&NavigablePath> {
        self.parent.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn depth(&self) -> usize {
        self.parent.as_ref().map_or(0, |p| p.depth() + 1)
    }

    /// Dot-separated rendering from the root, e.g. `e.manager.orders`.
    pub fn full_path(&self) -> String {
        match &self.parent {
            None => self.local_name.clone(),
            Some(parent) => format!("{}.{}", parent.full_path(), self.local_name),
        }
    }
}

/// Segment of a type-narrowing step, e.g. `treat(Manager)`.
pub fn treat_segment(target_type: &str) -> String {
    format!("treat({})", target_type)
}

/// Segment of an ad-hoc entity join, e.g. `join(Address)`.
pub fn entity_join_segment(entity_name: &str) -> String {
    format!("join({})", entity_name)
}

impl fmt::Display for NavigablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}
