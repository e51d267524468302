//! Optimistic status mutations.
//!
//! A status change is projected into every cached page of the family before
//! the write is sent. The prior entries are held in a [`MutationSnapshot`];
//! on success the snapshot is discarded, on failure it is written back. Either
//! way the family is invalidated afterwards so the next read reconciles with
//! the data source.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use grid_model::{Record, RecordId, RecordStatus};

use crate::cache::{CacheEntry, CacheState, QueryCache, lock};
use crate::error::MutationError;
use crate::key::QueryKey;
use crate::source::{DataSource, MutationAck};

/// Cached entries of a family as they were before a mutation.
#[derive(Debug, Default)]
pub struct MutationSnapshot {
    entries: Vec<(QueryKey, CacheEntry)>,
}

impl MutationSnapshot {
    pub fn keys(&self) -> impl Iterator<Item = &QueryKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheState {
    fn snapshot_family(&self, family: &str) -> MutationSnapshot {
        let entries = self
            .entries
            .iter()
            .filter(|(key, _)| key.in_family(family))
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect();
        MutationSnapshot { entries }
    }

    /// Rewrite the status of `record_id` in every cached page of `family`.
    fn project_status(&mut self, family: &str, record_id: &RecordId, status: RecordStatus) -> usize {
        let mut touched = 0;
        for (_, entry) in self
            .entries
            .iter_mut()
            .filter(|(key, _)| key.in_family(family))
        {
            for record in entry.value.records.iter_mut().filter(|r| &r.id == record_id) {
                record.status = status;
                touched += 1;
            }
        }
        touched
    }

    /// Put back every snapshotted entry exactly as it was.
    fn restore(&mut self, snapshot: MutationSnapshot) {
        for (key, entry) in snapshot.entries {
            match self.entries.peek_mut(&key) {
                Some(slot) => *slot = entry,
                None => {
                    self.entries.push(key, entry);
                }
            }
        }
    }

    fn release_pending(&mut self, record_id: &RecordId) {
        if let Some(count) = self.pending.get_mut(record_id) {
            *count -= 1;
            if *count == 0 {
                self.pending.remove(record_id);
            }
        }
    }
}

/// A status change between projection and settlement.
///
/// Settling consumes the snapshot exactly once. Dropping an unsettled
/// mutation rolls it back.
struct PendingMutation {
    state: Arc<Mutex<CacheState>>,
    family: String,
    record_id: RecordId,
    snapshot: Option<MutationSnapshot>,
}

impl PendingMutation {
    fn begin(
        state: &Arc<Mutex<CacheState>>,
        family: &str,
        record_id: &RecordId,
        status: RecordStatus,
    ) -> Self {
        let mut guard = lock(state);
        let cancelled = guard.cancel_family(family);
        let snapshot = guard.snapshot_family(family);
        let touched = guard.project_status(family, record_id, status);
        *guard.pending.entry(record_id.clone()).or_insert(0) += 1;
        debug!(
            record = %record_id,
            %status,
            cancelled,
            snapshotted = snapshot.len(),
            touched,
            "Projected status change"
        );

        Self {
            state: Arc::clone(state),
            family: family.to_string(),
            record_id: record_id.clone(),
            snapshot: Some(snapshot),
        }
    }

    fn commit(mut self) {
        self.settle(false);
    }

    fn rollback(mut self) {
        self.settle(true);
    }

    fn settle(&mut self, restore: bool) {
        let Some(snapshot) = self.snapshot.take() else {
            return;
        };
        let mut state = lock(&self.state);
        if restore {
            state.restore(snapshot);
        }
        state.release_pending(&self.record_id);
        state.invalidate_family(&self.family);
    }
}

impl Drop for PendingMutation {
    fn drop(&mut self) {
        if self.snapshot.is_some() {
            warn!(record = %self.record_id, "Status change abandoned before settling, rolling back");
            self.settle(true);
        }
    }
}

impl<D: DataSource> QueryCache<D> {
    /// Change the status of one record with an optimistic cache update.
    ///
    /// Every cached page of the family shows the new status before the write
    /// is sent. On failure the pages are restored to their prior values and
    /// the error is returned for the failure notification.
    pub async fn mutate_status(
        &self,
        record_id: &RecordId,
        status: RecordStatus,
    ) -> Result<MutationAck, MutationError> {
        let pending = PendingMutation::begin(&self.state, &self.family, record_id, status);

        let result = self.source.mutate_status(record_id, status).await;
        match &result {
            Ok(ack) => {
                info!(record = %record_id, %status, message = %ack.message, "Status change confirmed");
                pending.commit();
            }
            Err(error) => {
                warn!(record = %record_id, %status, %error, "Status change failed, restoring cached pages");
                pending.rollback();
            }
        }
        result
    }

    /// Flip a record between active and inactive.
    pub async fn toggle_status(&self, record: &Record) -> Result<MutationAck, MutationError> {
        self.mutate_status(&record.id, record.status.toggled()).await
    }

    /// Whether a status change for `record_id` has not settled yet.
    pub fn is_mutating(&self, record_id: &RecordId) -> bool {
        lock(&self.state).pending.contains_key(record_id)
    }

    /// Number of records with an unsettled status change.
    pub fn pending_mutations(&self) -> usize {
        lock(&self.state).pending.len()
    }
}
