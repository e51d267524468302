use thiserror::Error;

/// Invalid column metadata or view parameters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("duplicate column key: {key}")]
    DuplicateColumnKey { key: String },
    #[error("column '{header}' has an empty key")]
    EmptyColumnKey { header: String },
    #[error("invalid column metadata: {reason}")]
    InvalidMetadata { reason: String },
    #[error("page size must be positive (got {page_size})")]
    InvalidPageSize { page_size: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;
