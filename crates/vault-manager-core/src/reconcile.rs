//! Key-indexed diff between desired and actual entity collections.

use std::collections::{HashMap, HashSet};

use crate::entity::Entity;

/// The partition computed by [`diff`].
///
/// `to_write` only holds desired entities and `to_delete` only holds actual
/// entities whose key is absent from desired, so the two never overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct Diff<E> {
    /// Desired entities that are missing remotely or differ from the remote value.
    pub to_write: Vec<E>,
    /// Actual entities with no desired counterpart.
    pub to_delete: Vec<E>,
}

impl<E> Diff<E> {
    /// Returns `true` if the remote state has already converged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_write.is_empty() && self.to_delete.is_empty()
    }
}

impl<E> Default for Diff<E> {
    fn default() -> Self {
        Self {
            to_write: Vec::new(),
            to_delete: Vec::new(),
        }
    }
}

/// Partitions `desired ∪ actual` into entities to write and entities to delete.
///
/// A desired entity is written when its key is absent from `actual` or when
/// the entity found under that key is not [`equal`](Entity::equals). Writes
/// replace the remote value wholesale; nothing is merged. An actual entity is
/// deleted when its key is absent from `desired`.
///
/// Output order follows input order. If a collection repeats a key, the last
/// occurrence in `actual` is the one compared against.
pub fn diff<E: Entity + Clone>(desired: &[E], actual: &[E]) -> Diff<E> {
    let actual_index: HashMap<&str, &E> = actual.iter().map(|a| (a.key(), a)).collect();
    let desired_keys: HashSet<&str> = desired.iter().map(|d| d.key()).collect();

    let to_write = desired
        .iter()
        .filter(|d| match actual_index.get(d.key()) {
            None => true,
            Some(found) => !d.equals(*found),
        })
        .cloned()
        .collect();

    let to_delete = actual
        .iter()
        .filter(|a| !desired_keys.contains(a.key()))
        .cloned()
        .collect();

    Diff {
        to_write,
        to_delete,
    }
}
