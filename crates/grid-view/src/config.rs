//! Grid configuration.
//!
//! Loaded from a TOML file; every field has a default so a partial file (or
//! no file at all) is valid.
//!
//! ```toml
//! debounce_ms = 300
//! default_page_size = 10
//! cache_capacity = 64
//! settings_namespace = "record-grid.column-visibility"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Quiet interval before search input settles.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Maximum number of cached list pages.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Namespace under which column visibility is persisted.
pub const DEFAULT_SETTINGS_NAMESPACE: &str = "record-grid.column-visibility";

/// Grid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Debounce interval for search input, in milliseconds.
    pub debounce_ms: u64,

    /// Page size used when the view starts.
    pub default_page_size: usize,

    /// Maximum number of cached list pages.
    pub cache_capacity: usize,

    /// Namespace for persisted column visibility.
    pub settings_namespace: String,

    /// Directory of the file settings store. Platform config dir when unset.
    pub settings_dir: Option<PathBuf>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            default_page_size: grid_model::DEFAULT_PAGE_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            settings_namespace: DEFAULT_SETTINGS_NAMESPACE.to_string(),
            settings_dir: None,
        }
    }
}

impl GridConfig {
    /// Load configuration from a TOML file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "default_page_size",
                reason: "must be positive".to_string(),
            });
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache_capacity",
                reason: "must be positive".to_string(),
            });
        }
        if self.settings_namespace.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "settings_namespace",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Debounce interval as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
