//! Persisted settings store.
//!
//! Settings are stored as one JSON document per namespace. Column visibility
//! is read once at startup and written on every change; a read or parse
//! failure falls back to "all columns visible".

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use grid_model::ColumnVisibility;

use crate::error::StoreError;

/// Keyed read/write access to durable settings.
pub trait SettingsStore {
    /// Read the raw document stored under `namespace`, `None` when absent.
    fn read(&self, namespace: &str) -> Result<Option<String>, StoreError>;

    /// Replace the document stored under `namespace`.
    fn write(&mut self, namespace: &str, contents: &str) -> Result<(), StoreError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-memory settings store.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    documents: HashMap<String, String>,
    writes: usize,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document.
    #[must_use]
    pub fn with_document(mut self, namespace: &str, contents: &str) -> Self {
        self.documents
            .insert(namespace.to_string(), contents.to_string());
        self
    }

    /// Number of `write` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SettingsStore for MemorySettingsStore {
    fn read(&self, namespace: &str) -> Result<Option<String>, StoreError> {
        Ok(self.documents.get(namespace).cloned())
    }

    fn write(&mut self, namespace: &str, contents: &str) -> Result<(), StoreError> {
        self.documents
            .insert(namespace.to_string(), contents.to_string());
        self.writes += 1;
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Settings store backed by `<dir>/<namespace>.json` files.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    dir: PathBuf,
}

impl FileSettingsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in the platform config directory.
    pub fn default_location() -> Self {
        let dir = directories::ProjectDirs::from("com", "RecordGrid", "RecordGrid")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, namespace: &str) -> PathBuf {
        let file_name: String = namespace
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl SettingsStore for FileSettingsStore {
    fn read(&self, namespace: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(namespace);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io {
                operation: "read",
                path,
                source: e,
            }),
        }
    }

    /// Writes through a temp file and rename so a crash never leaves a
    /// half-written document.
    fn write(&mut self, namespace: &str, contents: &str) -> Result<(), StoreError> {
        let path = self.path_for(namespace);
        let temp_path = path.with_extension("json.tmp");

        fs::create_dir_all(&self.dir).map_err(|e| StoreError::Io {
            operation: "create directory",
            path: self.dir.clone(),
            source: e,
        })?;

        let mut file = File::create(&temp_path).map_err(|e| StoreError::Io {
            operation: "create",
            path: temp_path.clone(),
            source: e,
        })?;
        file.write_all(contents.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| StoreError::Io {
                operation: "write",
                path: temp_path.clone(),
                source: e,
            })?;

        fs::rename(&temp_path, &path).map_err(|e| StoreError::Io {
            operation: "rename",
            path: path.clone(),
            source: e,
        })?;

        tracing::debug!("Saved settings to {}", path.display());
        Ok(())
    }
}

// =============================================================================
// COLUMN VISIBILITY
// =============================================================================

/// Load column visibility, falling back to "all visible" on any failure.
pub fn load_column_visibility(store: &impl SettingsStore, namespace: &str) -> ColumnVisibility {
    match try_load_column_visibility(store, namespace) {
        Ok(visibility) => visibility,
        Err(e) => {
            tracing::warn!("Ignoring stored column visibility: {e}");
            ColumnVisibility::new()
        }
    }
}

fn try_load_column_visibility(
    store: &impl SettingsStore,
    namespace: &str,
) -> Result<ColumnVisibility, StoreError> {
    let Some(contents) = store.read(namespace)? else {
        return Ok(ColumnVisibility::new());
    };
    serde_json::from_str(&contents).map_err(|e| StoreError::Parse {
        namespace: namespace.to_string(),
        source: e,
    })
}

/// Persist column visibility.
pub fn save_column_visibility(
    store: &mut impl SettingsStore,
    namespace: &str,
    visibility: &ColumnVisibility,
) -> Result<(), StoreError> {
    let contents =
        serde_json::to_string(visibility).map_err(|e| StoreError::Serialize { source: e })?;
    store.write(namespace, &contents)
}
