//! In-process data source.
//!
//! Applies status filter, search, sort and pagination over a record vector.
//! Used by the CLI and as the authoritative store in tests.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use grid_model::{PageData, PageRequest, Record, RecordId, RecordStatus, SortSpec};

use crate::error::{FetchError, MutationError};
use crate::source::{DataSource, MutationAck};

/// Server-computed field refreshed on every status change.
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Record store held in memory.
#[derive(Debug, Default)]
pub struct MemoryDataSource {
    records: Mutex<Vec<Record>>,
    latency: Duration,
    offline: AtomicBool,
    reject_mutations: AtomicBool,
    fetch_calls: AtomicUsize,
    mutation_calls: AtomicUsize,
}

impl MemoryDataSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    /// Delay applied to every request.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Simulate lost connectivity for both reads and writes.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    /// Reject every subsequent status change.
    pub fn set_reject_mutations(&self, reject: bool) {
        self.reject_mutations.store(reject, AtomicOrdering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(AtomicOrdering::SeqCst)
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls.load(AtomicOrdering::SeqCst)
    }

    /// Authoritative copy of a record.
    pub fn record(&self, id: &RecordId) -> Option<Record> {
        self.records().iter().find(|r| &r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    fn records(&self) -> MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer a page request synchronously.
    pub fn query(&self, request: &PageRequest) -> PageData {
        let records = self.records();
        let needle = request.query.trim().to_lowercase();

        let mut matching: Vec<&Record> = records
            .iter()
            .filter(|r| request.status.is_none_or(|status| r.status == status))
            .filter(|r| needle.is_empty() || matches_search(r, &needle))
            .collect();

        if let Some(sort) = &request.sort {
            sort_records(&mut matching, sort);
        }

        let total_count = matching.len();
        let page = matching
            .into_iter()
            .skip(request.offset())
            .take(request.page_size)
            .cloned()
            .collect();

        PageData::new(page, total_count)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl DataSource for MemoryDataSource {
    async fn fetch_page(&self, request: PageRequest) -> Result<PageData, FetchError> {
        self.fetch_calls.fetch_add(1, AtomicOrdering::SeqCst);
        self.simulate_latency().await;

        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(FetchError::network("data source is offline"));
        }

        let data = self.query(&request);
        debug!(
            page = request.page,
            page_size = request.page_size,
            total = data.total_count,
            "Served page"
        );
        Ok(data)
    }

    async fn mutate_status(
        &self,
        id: &RecordId,
        status: RecordStatus,
    ) -> Result<MutationAck, MutationError> {
        self.mutation_calls.fetch_add(1, AtomicOrdering::SeqCst);
        self.simulate_latency().await;

        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(MutationError::network("data source is offline"));
        }
        if self.reject_mutations.load(AtomicOrdering::SeqCst) {
            return Err(MutationError::rejected("status changes are disabled"));
        }

        let mut records = self.records();
        let record = records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| MutationError::NotFound { id: id.clone() })?;

        record.status = status;
        record.fields.insert(
            UPDATED_AT_FIELD.to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );

        Ok(MutationAck::new(format!(
            "{} is now {}",
            display_name(record),
            status.label().to_lowercase()
        )))
    }
}

fn display_name(record: &Record) -> String {
    record
        .field("name")
        .and_then(Value::as_str)
        .map_or_else(|| record.id.to_string(), str::to_string)
}

/// Case-insensitive substring match over the id, string fields and group names.
fn matches_search(record: &Record, needle: &str) -> bool {
    if record.id.as_str().to_lowercase().contains(needle) {
        return true;
    }
    let in_fields = record.fields.values().any(|value| match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        _ => false,
    });
    in_fields
        || record
            .groups
            .iter()
            .any(|g| g.group_name.to_lowercase().contains(needle))
}

fn sort_records(records: &mut [&Record], sort: &SortSpec) {
    records.sort_by(|a, b| {
        let ordering = compare_cells(
            a.cell(&sort.field_key).as_ref(),
            b.cell(&sort.field_key).as_ref(),
        );
        if sort.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

/// Missing and null values sort last in ascending order.
fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::String(x)), Some(Value::String(y))) => {
            x.to_lowercase().cmp(&y.to_lowercase())
        }
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
