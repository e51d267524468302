//! User-adjustable view parameters.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::page::PageRequest;
use crate::record::{Record, RecordStatus};

/// Page size used when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

// =============================================================================
// STATUS FILTER
// =============================================================================

/// Status filter applied to the record list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// The concrete status this filter selects, `None` for [`StatusFilter::All`].
    pub fn status(&self) -> Option<RecordStatus> {
        match self {
            Self::All => None,
            Self::Active => Some(RecordStatus::Active),
            Self::Inactive => Some(RecordStatus::Inactive),
        }
    }

    /// Whether a record passes this filter.
    pub fn matches(&self, record: &Record) -> bool {
        self.status().is_none_or(|status| record.status == status)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("Unknown status filter: {s}")),
        }
    }
}

impl From<RecordStatus> for StatusFilter {
    fn from(status: RecordStatus) -> Self {
        match status {
            RecordStatus::Active => Self::Active,
            RecordStatus::Inactive => Self::Inactive,
        }
    }
}

// =============================================================================
// SORT
// =============================================================================

/// Active sort order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub field_key: String,
    pub descending: bool,
}

impl SortSpec {
    pub fn ascending(field_key: impl Into<String>) -> Self {
        Self {
            field_key: field_key.into(),
            descending: false,
        }
    }

    pub fn descending(field_key: impl Into<String>) -> Self {
        Self {
            field_key: field_key.into(),
            descending: true,
        }
    }

    /// `"asc"` or `"desc"`.
    pub fn direction(&self) -> &'static str {
        if self.descending { "desc" } else { "asc" }
    }
}

// =============================================================================
// VIEW PARAMS
// =============================================================================

/// Column key to visibility flag. Missing keys are visible.
pub type ColumnVisibility = BTreeMap<String, bool>;

/// Every user-adjustable parameter of a grid view.
///
/// All fields except `column_visibility` decide which page of data is
/// requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewParams {
    pub search_text: String,
    pub status_filter: StatusFilter,
    pub page_index: usize,
    pub page_size: usize,
    pub sort: Option<SortSpec>,
    pub column_visibility: ColumnVisibility,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            status_filter: StatusFilter::All,
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
            column_visibility: ColumnVisibility::new(),
        }
    }
}

impl ViewParams {
    /// Default parameters with a specific page size.
    pub fn with_page_size(page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(ModelError::InvalidPageSize { page_size });
        }
        Ok(Self {
            page_size,
            ..Default::default()
        })
    }

    /// Whether a column is visible. Unknown keys default to visible.
    pub fn is_column_visible(&self, key: &str) -> bool {
        self.column_visibility.get(key).copied().unwrap_or(true)
    }

    /// Build the data-source request for these parameters.
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page_index + 1,
            page_size: self.page_size,
            query: self.search_text.clone(),
            status: self.status_filter.status(),
            sort: self.sort.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_is_one_based() {
        let params = ViewParams {
            page_index: 2,
            status_filter: StatusFilter::Inactive,
            ..Default::default()
        };
        let request = params.page_request();
        assert_eq!(request.page, 3);
        assert_eq!(request.status, Some(RecordStatus::Inactive));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(ViewParams::with_page_size(0).is_err());
        assert_eq!(ViewParams::with_page_size(25).unwrap().page_size, 25);
    }

    #[test]
    fn test_column_visibility_defaults_visible() {
        let mut params = ViewParams::default();
        params.column_visibility.insert("email".to_string(), false);
        assert!(!params.is_column_visible("email"));
        assert!(params.is_column_visible("name"));
    }
}
