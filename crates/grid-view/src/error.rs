//! View-state error types.

use std::path::PathBuf;

use thiserror::Error;

use grid_model::ModelError;

/// Persisted-settings store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error.
    #[error("Failed to {operation} settings file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored contents could not be parsed.
    #[error("Stored settings under '{namespace}' are corrupt")]
    Parse {
        namespace: String,
        #[source]
        source: serde_json::Error,
    },

    /// Settings could not be serialized.
    #[error("Failed to serialize settings")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration file failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Rejected view-state change.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("Unknown column: {key}")]
    UnknownColumn { key: String },

    #[error("Column '{key}' is not sortable")]
    NotSortable { key: String },

    #[error("Column '{key}' is pinned and cannot be hidden")]
    ColumnPinned { key: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    /// The in-memory change was applied but could not be persisted.
    #[error("Failed to persist view settings")]
    Store(#[from] StoreError),
}

impl ViewError {
    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::UnknownColumn { .. } => Some("Check the column metadata for this view."),
            Self::NotSortable { .. } => Some("Only columns marked sortable can order the list."),
            Self::ColumnPinned { .. } => None,
            Self::Model(_) => None,
            Self::Store(_) => Some("Your column choices apply to this session only."),
        }
    }
}
