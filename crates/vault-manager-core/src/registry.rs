//! Dispatch of a top-level configuration document to entity kinds.
//!
//! The document is a YAML mapping whose keys name entity kinds:
//!
//! ```yaml
//! vault_policies:
//!   - name: ops
//!     rules: |
//!       path "secret/*" { capabilities = ["read"] }
//! ```
//!
//! Each registered [`Configuration`] receives its own section re-encoded as
//! YAML. Kinds whose section is absent are not reconciled at all, so a
//! document that only lists policies never touches other kinds.

use async_trait::async_trait;
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::applier::{Applier, ApplyOutcome};
use crate::decode::Decoder;
use crate::error::{DecodeError, ReconcileError};
use crate::store::EntityStore;

/// Section name used when the top-level document itself fails to decode.
pub const TOPLEVEL: &str = "toplevel";

/// A reconcilable kind, addressed by its section name.
#[async_trait]
pub trait Configuration: Send + Sync {
    /// Top-level section this configuration consumes (e.g. `vault_policies`).
    fn name(&self) -> &str;

    /// Reconciles the kind against the raw bytes of its section.
    async fn apply(&self, raw: &[u8], dry_run: bool) -> Result<ApplyOutcome, ReconcileError>;
}

#[async_trait]
impl<S, D> Configuration for Applier<S, D>
where
    S: EntityStore,
    D: Decoder<S::Entity> + 'static,
{
    fn name(&self) -> &str {
        self.kind()
    }

    async fn apply(&self, raw: &[u8], dry_run: bool) -> Result<ApplyOutcome, ReconcileError> {
        Applier::apply(self, raw, dry_run).await
    }
}

/// Registered configurations, applied in registration order.
#[derive(Default)]
pub struct Registry {
    configurations: Vec<Box<dyn Configuration>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a configuration under its [`name`](Configuration::name).
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Registry` if the name is already taken.
    pub fn register(&mut self, configuration: Box<dyn Configuration>) -> Result<(), ReconcileError> {
        if self.get(configuration.name()).is_some() {
            return Err(ReconcileError::registry(format!(
                "configuration '{}' is already registered",
                configuration.name()
            )));
        }
        self.configurations.push(configuration);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Configuration> {
        self.configurations
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configurations.iter().map(|c| c.name())
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    /// Applies every registered configuration whose section appears in `raw`.
    ///
    /// Sections with no registered configuration are logged and ignored.
    /// The first failing configuration aborts the run; configurations
    /// registered after it are not applied.
    pub async fn apply_document(
        &self,
        raw: &[u8],
        dry_run: bool,
    ) -> Result<Vec<ApplyOutcome>, ReconcileError> {
        let document = parse_document(raw).map_err(|source| ReconcileError::Decode {
            kind: TOPLEVEL.to_string(),
            source,
        })?;

        for (section, _) in document.iter() {
            match section.as_str() {
                Some(name) if self.get(name).is_some() => {}
                Some(name) => warn!(section = name, "No configuration registered for section; ignoring"),
                None => warn!(section = ?section, "Ignoring non-string top-level key"),
            }
        }

        let mut outcomes = Vec::new();
        for configuration in &self.configurations {
            let name = configuration.name();
            let Some(section) = document.get(name) else {
                debug!(section = name, "Section absent from document; skipping");
                continue;
            };
            let raw_section = serde_yaml::to_string(section).map_err(|e| ReconcileError::Decode {
                kind: name.to_string(),
                source: DecodeError::Yaml(e),
            })?;
            outcomes.push(configuration.apply(raw_section.as_bytes(), dry_run).await?);
        }
        Ok(outcomes)
    }
}

fn parse_document(raw: &[u8]) -> Result<Mapping, DecodeError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_slice::<Value>(raw)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        other => Err(DecodeError::invalid(format!(
            "top-level document must be a mapping of section names, found {}",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
