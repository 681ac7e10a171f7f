//! # vault-manager-vault
//!
//! Vault-specific half of vault-manager: an HTTP client for the Vault API
//! and the entity kinds reconciled against it.
//!
//! Each kind contributes one [`Configuration`](vault_manager_core::Configuration)
//! to the registry returned by [`default_registry`].

mod client;
mod error;
pub mod policy;

pub use client::{VaultClient, VaultConfig};
pub use error::VaultError;
pub use policy::{DEFAULT_PROTECTED, POLICIES_SECTION, Policy, PolicyStore, policy_applier};

use vault_manager_core::{ReconcileResult, Registry};

/// Registry with every kind this crate knows how to reconcile.
pub fn default_registry(client: VaultClient) -> ReconcileResult<Registry> {
    let mut registry = Registry::new();
    registry.register(Box::new(policy_applier(client)))?;
    Ok(registry)
}
