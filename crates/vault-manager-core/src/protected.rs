//! Identifiers excluded from deletion.

use std::collections::HashSet;

/// Identifiers that are never deleted, whatever the diff says.
///
/// Only the delete side consults this set; a protected entity that is
/// declared in desired state is still written.
#[derive(Debug, Clone, Default)]
pub struct ProtectedNames {
    names: HashSet<String>,
}

impl ProtectedNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// An empty set: every undeclared entity is eligible for deletion.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.names.contains(key)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
