//! Data-source collaborator interface.

use std::future::Future;

use grid_model::{PageData, PageRequest, RecordId, RecordStatus};

use crate::error::{FetchError, MutationError};

/// Acknowledgment of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationAck {
    /// Confirmation message for the success notification.
    pub message: String,
}

impl MutationAck {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Transport to the authoritative record store.
///
/// Implementations perform the network request; the cache never interprets
/// filter, search or sort semantics itself.
pub trait DataSource: Send + Sync + 'static {
    /// Fetch one page of records.
    fn fetch_page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<PageData, FetchError>> + Send;

    /// Change the status of a single record.
    fn mutate_status(
        &self,
        id: &RecordId,
        status: RecordStatus,
    ) -> impl Future<Output = Result<MutationAck, MutationError>> + Send;
}
