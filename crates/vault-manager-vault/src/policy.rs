//! ACL policies, reconciled under the `vault_policies` section.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vault_manager_core::{
    Applier, Entity, EntityStore, ProtectedNames, StoreError, YamlDecoder, downcast,
};

use crate::client::VaultClient;
use crate::error::VaultError;

/// Top-level section name for policies.
pub const POLICIES_SECTION: &str = "vault_policies";

/// Built-in policies every Vault server carries; never deleted.
pub const DEFAULT_PROTECTED: [&str; 2] = ["root", "default"];

/// A named ACL policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    pub rules: String,
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

/// Policy endpoints of a [`VaultClient`], seen as an [`EntityStore`].
#[derive(Debug, Clone)]
pub struct PolicyStore {
    client: VaultClient,
}

impl PolicyStore {
    pub fn new(client: VaultClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EntityStore for PolicyStore {
    type Entity = Policy;

    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.client.list_policies().await?)
    }

    async fn fetch(&self, key: &str) -> Result<Policy, StoreError> {
        let rules = self.client.read_policy(key).await.map_err(|e| match e {
            VaultError::Status { status: 404, .. } => StoreError::not_found(key),
            other => other.into(),
        })?;
        Ok(Policy {
            name: key.to_string(),
            rules,
        })
    }

    async fn write(&self, entity: &Policy) -> Result<(), StoreError> {
        Ok(self.client.put_policy(&entity.name, &entity.rules).await?)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        Ok(self.client.delete_policy(key).await?)
    }
}

/// Builds the applier for the `vault_policies` section.
pub fn policy_applier(client: VaultClient) -> Applier<PolicyStore, YamlDecoder> {
    Applier::new(
        POLICIES_SECTION,
        Arc::new(PolicyStore::new(client)),
        YamlDecoder,
    )
    .with_protected(ProtectedNames::new(DEFAULT_PROTECTED))
}

#[cfg(test)]
mod tests {
    use vault_manager_core::Decoder;

    use super::*;

    fn policy(name: &str, rules: &str) -> Policy {
        Policy {
            name: name.into(),
            rules: rules.into(),
        }
    }

    #[test]
    fn test_policy_equality_covers_name_and_rules() {
        assert!(policy("ops", "a").equals(&policy("ops", "a")));
        assert!(!policy("ops", "a").equals(&policy("ops", "b")));
        assert!(!policy("ops", "a").equals(&policy("dev", "a")));
    }

    #[test]
    fn test_rules_are_compared_verbatim() {
        assert!(!policy("ops", "a\n").equals(&policy("ops", "a")));
    }

    #[test]
    fn test_policies_decode_from_yaml() {
        let raw = b"- name: ops\n  rules: |\n    path \"secret/*\" {\n      capabilities = [\"read\"]\n    }\n";
        let policies: Vec<Policy> = YamlDecoder.decode(raw).unwrap();
        assert_eq!(policies.len(), 1);
        assert_eq!(policies[0].key(), "ops");
        assert!(policies[0].rules.starts_with("path \"secret/*\""));
    }

    #[test]
    fn test_default_policies_are_protected() {
        let client = VaultClient::new(crate::VaultConfig::new("http://127.0.0.1:8200", "t")).unwrap();
        let applier = policy_applier(client);
        assert_eq!(applier.kind(), POLICIES_SECTION);
        assert!(applier.protected().contains("root"));
        assert!(applier.protected().contains("default"));
        assert!(!applier.protected().contains("ops"));
    }
}
