//! The remote side of a reconciliation.

use async_trait::async_trait;

use crate::entity::Entity;
use crate::error::StoreError;

/// Remote operations the engine needs for one entity kind.
///
/// Implementations wrap a concrete service client. They are shared across
/// concurrent fetch tasks, so they must be thread-safe (`Send + Sync`) and
/// owned (`'static`).
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use vault_manager_core::{EntityStore, StoreError};
///
/// struct MountStore {
///     client: VaultClient,
/// }
///
/// #[async_trait]
/// impl EntityStore for MountStore {
///     type Entity = Mount;
///
///     async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
///         // Implementation
///     }
///     // ... other methods
/// }
/// ```
#[async_trait]
pub trait EntityStore: Send + Sync + 'static {
    /// The entity kind this store manages.
    type Entity: Entity + Clone;

    /// Lists the identifiers of every entity that currently exists.
    ///
    /// An empty list is a valid answer, not an error.
    async fn list_keys(&self) -> Result<Vec<String>, StoreError>;

    /// Fetches the full current value of `key`.
    async fn fetch(&self, key: &str) -> Result<Self::Entity, StoreError>;

    /// Writes `entity`, replacing whatever value is stored under its key.
    async fn write(&self, entity: &Self::Entity) -> Result<(), StoreError>;

    /// Deletes the entity stored under `key`.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
