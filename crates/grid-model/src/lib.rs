//! Data model shared by the record grid crates.
//!
//! - [`ColumnDescriptor`] / [`ColumnSet`]: declarative column metadata
//! - [`Record`]: row entity with typed status and groups plus free-form fields
//! - [`ViewParams`]: search, filter, pagination, sort and column visibility
//! - [`PageRequest`] / [`PageData`]: data-source request and response

pub mod column;
pub mod error;
pub mod page;
pub mod record;
pub mod view;

pub use column::{ColumnDescriptor, ColumnSet, ColumnType};
pub use error::{ModelError, Result};
pub use page::{PageData, PageRequest};
pub use record::{GroupRef, Record, RecordId, RecordStatus};
pub use view::{ColumnVisibility, DEFAULT_PAGE_SIZE, SortSpec, StatusFilter, ViewParams};
