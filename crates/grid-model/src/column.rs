//! Declarative column metadata.
//!
//! A grid view is described entirely by a list of [`ColumnDescriptor`]s,
//! usually deserialized from JSON or TOML. The column `type` decides how a
//! raw cell value is rendered (see `grid-render`).

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

// =============================================================================
// COLUMN TYPE
// =============================================================================

/// Declared rendering type of a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Plain display text.
    #[default]
    String,
    /// Closed-enum value shown as a colored indicator.
    Badge,
    /// Date-like value formatted for display.
    Date,
    /// Ordered list of group references shown as tags.
    Chiplist,
    /// Any type this build does not know about. Rendered as text.
    #[serde(other)]
    Unknown,
}

impl ColumnType {
    /// Returns the metadata name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Badge => "badge",
            Self::Date => "date",
            Self::Chiplist => "chiplist",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = std::convert::Infallible;

    /// Unrecognized names map to [`ColumnType::Unknown`].
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "string" => Self::String,
            "badge" => Self::Badge,
            "date" => Self::Date,
            "chiplist" => Self::Chiplist,
            _ => Self::Unknown,
        })
    }
}

// =============================================================================
// COLUMN DESCRIPTOR
// =============================================================================

/// Metadata for one grid column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    /// Field key on the record. Unique within a column set.
    pub key: String,
    /// Header label.
    pub header: String,
    /// Rendering type.
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    /// Preferred width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Whether the column may be used as a sort key.
    #[serde(default)]
    pub sortable: bool,
    /// Whether the column stays pinned and cannot be hidden.
    #[serde(default)]
    pub pinned: bool,
    /// strftime-style format for `date` columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
}

impl ColumnDescriptor {
    /// Create a column with the given key, header and type.
    pub fn new(key: impl Into<String>, header: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            column_type,
            width: None,
            sortable: false,
            pinned: false,
            date_format: None,
        }
    }

    /// Mark the column as sortable.
    #[must_use]
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Mark the column as pinned.
    #[must_use]
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    /// Set a preferred width.
    #[must_use]
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the date format used by `date` columns.
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }
}

// =============================================================================
// COLUMN SET
// =============================================================================

/// An ordered, validated set of columns.
///
/// Construction fails when two columns share a key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColumnSet {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnSet {
    /// Validate and wrap a list of columns.
    pub fn new(columns: Vec<ColumnDescriptor>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.key.trim().is_empty() {
                return Err(ModelError::EmptyColumnKey {
                    header: column.header.clone(),
                });
            }
            if !seen.insert(column.key.as_str()) {
                return Err(ModelError::DuplicateColumnKey {
                    key: column.key.clone(),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Parse a column set from its JSON description.
    pub fn from_json(json: &str) -> Result<Self> {
        let columns: Vec<ColumnDescriptor> =
            serde_json::from_str(json).map_err(|e| ModelError::InvalidMetadata {
                reason: e.to_string(),
            })?;
        Self::new(columns)
    }

    /// Look up a column by key.
    pub fn get(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Whether a column with this key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate the columns in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ColumnDescriptor> {
        self.columns.iter()
    }

    /// Column keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'de> Deserialize<'de> for ColumnSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let columns = Vec::<ColumnDescriptor>::deserialize(deserializer)?;
        Self::new(columns).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a ColumnSet {
    type Item = &'a ColumnDescriptor;
    type IntoIter = std::slice::Iter<'a, ColumnDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
