//! Data-source request and response shapes.

use serde::{Deserialize, Serialize};

use crate::record::{Record, RecordStatus};
use crate::view::SortSpec;

/// A request for one page of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
    /// Free-text search, empty for none.
    pub query: String,
    /// Status restriction, `None` for all records.
    pub status: Option<RecordStatus>,
    pub sort: Option<SortSpec>,
}

impl PageRequest {
    /// Offset of the first record on this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.page_size
    }
}

/// One page of records plus the total number of matching records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub records: Vec<Record>,
    pub total_count: usize,
}

impl PageData {
    pub fn new(records: Vec<Record>, total_count: usize) -> Self {
        Self {
            records,
            total_count,
        }
    }

    /// Number of pages for the given page size, at least one.
    pub fn page_count(&self, page_size: usize) -> usize {
        if page_size == 0 {
            return 1;
        }
        self.total_count.div_ceil(page_size).max(1)
    }

    /// Find a record on this page.
    pub fn record(&self, id: &crate::RecordId) -> Option<&Record> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
