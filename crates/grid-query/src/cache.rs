//! Keyed page cache with in-flight fetch sharing.
//!
//! Every list read goes through [`QueryCache::get`]. A valid entry is served
//! from memory; otherwise concurrent readers of the same key share a single
//! data-source request. Fetches carry a generation id so that a fetch which was
//! cancelled or superseded never writes its result into the cache; its readers
//! go back to the cache instead.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use lru::LruCache;
use tracing::{debug, trace};

use grid_model::{PageData, RecordId, ViewParams};

use crate::error::FetchError;
use crate::key::QueryKey;
use crate::source::DataSource;

/// Default number of pages kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// A cached page.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub value: PageData,
    pub fetched_at: DateTime<Utc>,
    /// Marked stale; the next read triggers a refetch.
    pub invalidated: bool,
}

impl CacheEntry {
    fn fresh(value: PageData) -> Self {
        Self {
            value,
            fetched_at: Utc::now(),
            invalidated: false,
        }
    }
}

/// How a shared fetch ended, as seen by every reader awaiting it.
#[derive(Debug, Clone)]
pub(crate) enum FetchOutcome {
    /// The fetch was current; on success its value is now cached.
    Settled(Result<PageData, FetchError>),
    /// A newer fetch for the same key replaced this one.
    Superseded,
    /// The fetch was cancelled; its result was discarded.
    Cancelled,
}

type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

struct InFlight {
    id: u64,
    future: SharedFetch,
}

/// Mutable cache state. Never held across an await point.
pub(crate) struct CacheState {
    pub(crate) entries: LruCache<QueryKey, CacheEntry>,
    in_flight: HashMap<QueryKey, InFlight>,
    pub(crate) pending: HashMap<RecordId, usize>,
    next_fetch_id: u64,
}

impl CacheState {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            in_flight: HashMap::new(),
            pending: HashMap::new(),
            next_fetch_id: 0,
        }
    }

    /// Record the result of fetch `id` if it is still the current one for `key`.
    fn settle_fetch(
        &mut self,
        key: &QueryKey,
        id: u64,
        result: Result<PageData, FetchError>,
    ) -> FetchOutcome {
        match self.in_flight.get(key) {
            Some(current) if current.id == id => {
                self.in_flight.remove(key);
                if let Ok(data) = &result
                    && let Some((evicted, _)) =
                        self.entries.push(key.clone(), CacheEntry::fresh(data.clone()))
                    && &evicted != key
                {
                    debug!(key = %evicted, "Evicted least recently used page");
                }
                FetchOutcome::Settled(result)
            }
            Some(_) => {
                trace!(%key, id, "Discarding superseded fetch");
                FetchOutcome::Superseded
            }
            None => {
                debug!(%key, id, "Discarding cancelled fetch");
                FetchOutcome::Cancelled
            }
        }
    }

    /// Drop every in-flight fetch of `family`. Returns how many were cancelled.
    pub(crate) fn cancel_family(&mut self, family: &str) -> usize {
        let before = self.in_flight.len();
        self.in_flight.retain(|key, _| !key.in_family(family));
        before - self.in_flight.len()
    }

    /// Mark every entry of `family` stale and cancel its in-flight fetches.
    pub(crate) fn invalidate_family(&mut self, family: &str) -> usize {
        let mut marked = 0;
        for (_, entry) in self
            .entries
            .iter_mut()
            .filter(|(key, _)| key.in_family(family))
        {
            entry.invalidated = true;
            marked += 1;
        }
        self.cancel_family(family);
        marked
    }

    /// A valid (not invalidated) entry for `key`, refreshing its recency.
    fn valid_entry(&mut self, key: &QueryKey) -> Option<PageData> {
        self.entries
            .get(key)
            .filter(|entry| !entry.invalidated)
            .map(|entry| entry.value.clone())
    }
}

pub(crate) fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keyed cache of list pages backed by a [`DataSource`].
///
/// Keys are scoped to the cache's family; see [`QueryKey`].
pub struct QueryCache<D> {
    pub(crate) source: Arc<D>,
    pub(crate) family: String,
    pub(crate) state: Arc<Mutex<CacheState>>,
}

impl<D: DataSource> QueryCache<D> {
    pub fn new(source: Arc<D>, family: impl Into<String>) -> Self {
        Self::with_capacity(source, family, DEFAULT_CACHE_CAPACITY)
    }

    /// A zero capacity is raised to one page.
    pub fn with_capacity(source: Arc<D>, family: impl Into<String>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            source,
            family: family.into(),
            state: Arc::new(Mutex::new(CacheState::new(capacity))),
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn source(&self) -> &Arc<D> {
        &self.source
    }

    /// Cache key for `params` in this cache's family.
    pub fn key(&self, params: &ViewParams) -> QueryKey {
        QueryKey::list(self.family.clone(), params)
    }

    /// Read the page for `params`.
    ///
    /// Served from cache when a valid entry exists. Otherwise joins the
    /// in-flight fetch for the key or starts one. A failed fetch leaves no
    /// entry behind. A fetch cancelled by a mutation is not a failure: the
    /// read resumes against whatever the cache holds afterwards.
    pub async fn get(&self, params: &ViewParams) -> Result<PageData, FetchError> {
        let key = self.key(params);
        let lookup = {
            let mut state = lock(&self.state);
            self.lookup(&mut state, &key)
        };
        let future = match lookup {
            Lookup::Hit(data) => return Ok(data),
            Lookup::Wait(future) => future,
        };
        self.await_fetch(key, future).await
    }

    /// Fetch `params` unconditionally, superseding any in-flight fetch.
    pub async fn refetch(&self, params: &ViewParams) -> Result<PageData, FetchError> {
        let key = self.key(params);
        let future = {
            let mut state = lock(&self.state);
            self.start_fetch(&mut state, &key)
        };
        self.await_fetch(key, future).await
    }

    /// Cached page for `params` without fetching, valid or stale.
    pub fn peek(&self, params: &ViewParams) -> Option<CacheEntry> {
        let key = self.key(params);
        lock(&self.state).entries.peek(&key).cloned()
    }

    /// Whether a fetch for `params` is running.
    pub fn is_fetching(&self, params: &ViewParams) -> bool {
        let key = self.key(params);
        lock(&self.state).in_flight.contains_key(&key)
    }

    /// Mark every page of `family` stale and cancel its in-flight fetches.
    pub fn invalidate_family(&self, family: &str) -> usize {
        let marked = lock(&self.state).invalidate_family(family);
        debug!(family, marked, "Invalidated family");
        marked
    }

    /// Invalidate this cache's own family.
    pub fn invalidate(&self) -> usize {
        self.invalidate_family(&self.family)
    }

    /// Drop every entry and in-flight fetch.
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.entries.clear();
        state.in_flight.clear();
    }

    /// Number of cached pages.
    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn start_fetch(&self, state: &mut CacheState, key: &QueryKey) -> SharedFetch {
        state.next_fetch_id += 1;
        let id = state.next_fetch_id;
        debug!(%key, id, "Starting fetch");

        let source = Arc::clone(&self.source);
        let shared_state = Arc::clone(&self.state);
        let fetch_key = key.clone();
        let future = async move {
            let result = source.fetch_page(fetch_key.request()).await;
            lock(&shared_state).settle_fetch(&fetch_key, id, result)
        }
        .boxed()
        .shared();

        state.in_flight.insert(
            key.clone(),
            InFlight {
                id,
                future: future.clone(),
            },
        );
        future
    }

    /// Valid entry for `key`, else the in-flight fetch, else a new fetch.
    fn lookup(&self, state: &mut CacheState, key: &QueryKey) -> Lookup {
        if let Some(data) = state.valid_entry(key) {
            trace!(%key, "Cache hit");
            return Lookup::Hit(data);
        }
        let joined = state.in_flight.get(key).map(|in_flight| {
            trace!(%key, id = in_flight.id, "Joining in-flight fetch");
            in_flight.future.clone()
        });
        Lookup::Wait(joined.unwrap_or_else(|| self.start_fetch(state, key)))
    }

    async fn await_fetch(
        &self,
        key: QueryKey,
        mut future: SharedFetch,
    ) -> Result<PageData, FetchError> {
        loop {
            match future.await {
                FetchOutcome::Settled(result) => return result,
                // Follow the replacement, which may already have settled.
                FetchOutcome::Superseded | FetchOutcome::Cancelled => {
                    let lookup = {
                        let mut state = lock(&self.state);
                        self.lookup(&mut state, &key)
                    };
                    match lookup {
                        Lookup::Hit(data) => return Ok(data),
                        Lookup::Wait(next) => future = next,
                    }
                }
            }
        }
    }
}

enum Lookup {
    Hit(PageData),
    Wait(SharedFetch),
}
