//! Orchestration of a single reconciliation run for one entity kind.
//!
//! A run is linear: decode desired state, fetch actual state in parallel,
//! diff, then apply writes and deletes one at a time. Any failure ends the
//! run with a [`ReconcileError`]; writes that already succeeded are not
//! rolled back, and the next run converges the rest.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument};

use crate::decode::Decoder;
use crate::entity::Entity;
use crate::error::ReconcileError;
use crate::protected::ProtectedNames;
use crate::reconcile::{Diff, diff};
use crate::store::EntityStore;

/// What a run wrote and deleted, or would have in a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    /// Entity kind that was reconciled.
    pub kind: String,
    /// Whether remote mutations were suppressed.
    pub dry_run: bool,
    /// Keys written (created or overwritten), in apply order.
    pub written: Vec<String>,
    /// Keys deleted, in apply order.
    pub deleted: Vec<String>,
    /// Protected keys the diff wanted to delete but were left in place.
    /// Always empty in a dry run, which does not report protected keys.
    pub skipped: Vec<String>,
}

impl ApplyOutcome {
    fn new(kind: &str, dry_run: bool) -> Self {
        Self {
            kind: kind.to_string(),
            dry_run,
            written: Vec::new(),
            deleted: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Returns `true` if nothing was (or would be) written or deleted.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.written.is_empty() && self.deleted.is_empty()
    }
}

/// Reconciles one entity kind against an [`EntityStore`].
///
/// The store is passed in explicitly so tests can substitute a double.
pub struct Applier<S: EntityStore, D> {
    kind: String,
    store: Arc<S>,
    decoder: D,
    protected: ProtectedNames,
}

impl<S, D> Applier<S, D>
where
    S: EntityStore,
    D: Decoder<S::Entity>,
{
    pub fn new(kind: impl Into<String>, store: Arc<S>, decoder: D) -> Self {
        Self {
            kind: kind.into(),
            store,
            decoder,
            protected: ProtectedNames::none(),
        }
    }

    /// Sets the identifiers that must never be deleted.
    pub fn with_protected(mut self, protected: ProtectedNames) -> Self {
        self.protected = protected;
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn protected(&self) -> &ProtectedNames {
        &self.protected
    }

    /// Converges the remote state to the entities declared in `raw`.
    ///
    /// In dry-run mode no write or delete call reaches the store; the
    /// outcome lists what would have been done.
    #[instrument(skip_all, fields(kind = %self.kind, dry_run = dry_run))]
    pub async fn apply(&self, raw: &[u8], dry_run: bool) -> Result<ApplyOutcome, ReconcileError> {
        let plan = self.plan(raw).await?;

        if dry_run {
            Ok(self.report_dry_run(&plan))
        } else {
            self.execute(&plan).await
        }
    }

    /// Decodes `raw`, fetches the current state and diffs the two.
    pub async fn plan(&self, raw: &[u8]) -> Result<Diff<S::Entity>, ReconcileError> {
        let desired = self
            .decoder
            .decode(raw)
            .map_err(|source| ReconcileError::Decode {
                kind: self.kind.clone(),
                source,
            })?;
        let actual = self.fetch_actual().await?;

        let plan = diff(&desired, &actual);
        debug!(
            desired = desired.len(),
            actual = actual.len(),
            to_write = plan.to_write.len(),
            to_delete = plan.to_delete.len(),
            "Computed diff"
        );
        Ok(plan)
    }

    /// Fetches every existing entity, one concurrent task per key.
    ///
    /// Each task returns its own entity; results are gathered only after
    /// the join, in listing order. The first failed fetch fails the whole
    /// call and aborts the tasks still running.
    pub async fn fetch_actual(&self) -> Result<Vec<S::Entity>, ReconcileError> {
        let keys = self
            .store
            .list_keys()
            .await
            .map_err(|source| ReconcileError::List {
                kind: self.kind.clone(),
                source,
            })?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut tasks = JoinSet::new();
        for (index, key) in keys.iter().cloned().enumerate() {
            let store = Arc::clone(&self.store);
            tasks.spawn(async move {
                let result = store.fetch(&key).await;
                (index, key, result)
            });
        }

        let mut fetched: HashMap<usize, S::Entity> = HashMap::with_capacity(keys.len());
        while let Some(joined) = tasks.join_next().await {
            let (index, key, result) = joined.map_err(|source| ReconcileError::Join {
                kind: self.kind.clone(),
                source,
            })?;
            let entity = result.map_err(|source| ReconcileError::Fetch {
                kind: self.kind.clone(),
                key: key.clone(),
                source,
            })?;
            debug!(key = %key, "Fetched existing entry");
            fetched.insert(index, entity);
        }

        Ok((0..keys.len())
            .filter_map(|index| fetched.remove(&index))
            .collect())
    }

    fn report_dry_run(&self, plan: &Diff<S::Entity>) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::new(&self.kind, true);

        for entity in &plan.to_write {
            info!(key = entity.key(), "[Dry Run] entry to be written");
            outcome.written.push(entity.key().to_string());
        }

        for entity in &plan.to_delete {
            if self.protected.contains(entity.key()) {
                continue;
            }
            info!(key = entity.key(), "[Dry Run] entry to be deleted");
            outcome.deleted.push(entity.key().to_string());
        }

        outcome
    }

    async fn execute(&self, plan: &Diff<S::Entity>) -> Result<ApplyOutcome, ReconcileError> {
        let mut outcome = ApplyOutcome::new(&self.kind, false);

        for entity in &plan.to_write {
            self.store
                .write(entity)
                .await
                .map_err(|source| ReconcileError::Write {
                    kind: self.kind.clone(),
                    key: entity.key().to_string(),
                    source,
                })?;
            info!(key = entity.key(), "Entry successfully written");
            outcome.written.push(entity.key().to_string());
        }

        for entity in &plan.to_delete {
            let key = entity.key();
            if self.protected.contains(key) {
                debug!(key, "Skipping protected entry");
                outcome.skipped.push(key.to_string());
                continue;
            }
            self.store
                .delete(key)
                .await
                .map_err(|source| ReconcileError::Delete {
                    kind: self.kind.clone(),
                    key: key.to_string(),
                    source,
                })?;
            info!(key, "Entry successfully deleted");
            outcome.deleted.push(key.to_string());
        }

        Ok(outcome)
    }
}
