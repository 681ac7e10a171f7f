//! The contract every reconcilable entity kind implements.

use std::any::Any;
use std::fmt::Debug;

/// A named, comparable configuration resource.
///
/// Two entities with the same [`key`](Entity::key) denote the same remote
/// resource. [`equals`](Entity::equals) decides whether that resource has
/// already converged. Kinds implement this independently; there is no
/// shared base type.
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use vault_manager_core::{Entity, downcast};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Mount {
///     path: String,
///     kind: String,
/// }
///
/// impl Entity for Mount {
///     fn key(&self) -> &str {
///         &self.path
///     }
///
///     fn equals(&self, other: &dyn Entity) -> bool {
///         downcast::<Self>(other).is_some_and(|other| self == other)
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
/// ```
pub trait Entity: Any + Debug + Send + Sync {
    /// Stable identifier, unique within the entity kind.
    fn key(&self) -> &str;

    /// Whether every significant attribute, including the key, matches.
    ///
    /// Must be reflexive, and must return `false` rather than fail when
    /// `other` belongs to a different kind.
    fn equals(&self, other: &dyn Entity) -> bool;

    /// Access to the concrete type, used by [`downcast`].
    fn as_any(&self) -> &dyn Any;
}

/// Views `other` as a `T`, or `None` if it is a different kind.
pub fn downcast<T: Entity>(other: &dyn Entity) -> Option<&T> {
    other.as_any().downcast_ref::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Policy {
        name: String,
        rules: String,
    }

    impl Entity for Policy {
        fn key(&self) -> &str {
            &self.name
        }

        fn equals(&self, other: &dyn Entity) -> bool {
            downcast::<Self>(other).is_some_and(|other| self == other)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct AuthMethod {
        path: String,
    }

    impl Entity for AuthMethod {
        fn key(&self) -> &str {
            &self.path
        }

        fn equals(&self, other: &dyn Entity) -> bool {
            downcast::<Self>(other).is_some_and(|other| self == other)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn policy(name: &str, rules: &str) -> Policy {
        Policy {
            name: name.into(),
            rules: rules.into(),
        }
    }

    #[test]
    fn test_equals_is_reflexive() {
        let p = policy("ops", "path \"*\" {}");
        assert!(p.equals(&p));
    }

    #[test]
    fn test_equals_detects_changed_attribute() {
        assert!(!policy("ops", "v1").equals(&policy("ops", "v2")));
        assert!(!policy("ops", "v1").equals(&policy("dev", "v1")));
    }

    #[test]
    fn test_equals_other_kind_is_false() {
        let p = policy("approle", "");
        let a = AuthMethod {
            path: "approle".into(),
        };
        assert_eq!(p.key(), a.key());
        assert!(!p.equals(&a));
        assert!(!a.equals(&p));
    }

    #[test]
    fn test_downcast() {
        let p = policy("ops", "v1");
        let erased: &dyn Entity = &p;
        assert_eq!(downcast::<Policy>(erased), Some(&p));
        assert!(downcast::<AuthMethod>(erased).is_none());
    }
}
