//! View-state synchronization for the record grid.
//!
//! - [`debounce`]: debounced input channel for search text
//! - [`codec`]: view parameters <-> URL-style query parameters
//! - [`params`]: external parameter store
//! - [`settings`]: persisted settings store (column visibility)
//! - [`sync`]: the synchronizer tying the three surfaces together
//! - [`config`]: grid configuration

pub mod codec;
pub mod config;
pub mod debounce;
pub mod error;
pub mod params;
pub mod settings;
pub mod sync;

pub use codec::{QueryParams, decode, encode, parse_query_string, to_query_string};
pub use config::GridConfig;
pub use debounce::Debouncer;
pub use error::{ConfigError, StoreError, ViewError};
pub use params::{MemoryParamStore, ParamStore};
pub use settings::{
    FileSettingsStore, MemorySettingsStore, SettingsStore, load_column_visibility,
    save_column_visibility,
};
pub use sync::ViewStateSync;
