//! # vault-manager-core
//!
//! Reconciliation engine for declaratively managed Vault configuration.
//!
//! This crate knows nothing about HTTP or about any particular Vault
//! endpoint. It defines the contracts an entity kind must satisfy and the
//! algorithm that converges a remote service to a desired state.
//!
//! ## Overview
//!
//! - [`Entity`]: identity key plus value equality.
//! - [`diff`]: partitions desired and actual entities into writes and deletes.
//! - [`EntityStore`]: list/fetch/write/delete against the remote service.
//! - [`Applier`]: decode, parallel fetch, diff, then sequential apply or dry run.
//! - [`Registry`]: routes the sections of a top-level document to their kinds.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vault_manager_core::{Applier, ProtectedNames, YamlDecoder};
//!
//! let applier = Applier::new("vault_policies", Arc::new(store), YamlDecoder)
//!     .with_protected(ProtectedNames::new(["root", "default"]));
//!
//! let outcome = applier.apply(raw_yaml, /* dry_run */ true).await?;
//! println!("would write {:?}", outcome.written);
//! ```

mod applier;
mod decode;
mod entity;
mod error;
mod protected;
mod reconcile;
pub mod registry;
mod store;

pub use applier::{Applier, ApplyOutcome};
pub use decode::{Decoder, YamlDecoder};
pub use entity::{Entity, downcast};
pub use error::{DecodeError, ErrorCategory, ReconcileError, StoreError};
pub use protected::ProtectedNames;
pub use reconcile::{Diff, diff};
pub use registry::{Configuration, Registry};
pub use store::EntityStore;

/// Type alias for a reconciliation result.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use vault_manager_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::applier::{Applier, ApplyOutcome};
    pub use crate::decode::{Decoder, YamlDecoder};
    pub use crate::entity::{Entity, downcast};
    pub use crate::error::{DecodeError, ErrorCategory, ReconcileError, StoreError};
    pub use crate::protected::ProtectedNames;
    pub use crate::reconcile::{Diff, diff};
    pub use crate::registry::{Configuration, Registry};
    pub use crate::store::EntityStore;
    pub use crate::ReconcileResult;
}
