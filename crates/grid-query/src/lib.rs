//! Query cache and optimistic mutation engine.
//!
//! - [`QueryCache`] serves list pages by [`QueryKey`], sharing in-flight fetches
//! - [`QueryCache::mutate_status`] applies status changes optimistically with
//!   snapshot rollback
//! - [`DataSource`] is the transport seam, [`MemoryDataSource`] an in-process
//!   implementation

pub mod cache;
pub mod error;
pub mod key;
pub mod memory;
pub mod mutation;
pub mod source;

pub use cache::{CacheEntry, DEFAULT_CACHE_CAPACITY, QueryCache};
pub use error::{FetchError, MutationError};
pub use key::QueryKey;
pub use memory::{MemoryDataSource, UPDATED_AT_FIELD};
pub use mutation::MutationSnapshot;
pub use source::{DataSource, MutationAck};
