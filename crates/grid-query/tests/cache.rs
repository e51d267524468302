//! Concurrency tests for the query cache and optimistic mutations.
//!
//! `GatedSource` holds every request until the test releases it, so the
//! interleaving of reads, writes and settlements is explicit.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use grid_model::{PageData, PageRequest, Record, RecordId, RecordStatus, ViewParams};
use grid_query::{
    DataSource, FetchError, MemoryDataSource, MutationAck, MutationError, QueryCache,
};
use tokio::sync::Semaphore;

struct GatedSource {
    inner: MemoryDataSource,
    fetch_gate: Semaphore,
    mutation_gates: Mutex<HashMap<RecordId, Arc<Semaphore>>>,
    rejected: Mutex<HashSet<RecordId>>,
    fetches: AtomicUsize,
    mutations: AtomicUsize,
}

impl GatedSource {
    fn new(records: Vec<Record>) -> Self {
        Self {
            inner: MemoryDataSource::new(records),
            fetch_gate: Semaphore::new(0),
            mutation_gates: Mutex::default(),
            rejected: Mutex::default(),
            fetches: AtomicUsize::new(0),
            mutations: AtomicUsize::new(0),
        }
    }

    fn release_fetches(&self, count: usize) {
        self.fetch_gate.add_permits(count);
    }

    fn release_mutation(&self, id: &str) {
        self.mutation_gate(&RecordId::new(id)).add_permits(1);
    }

    fn reject(&self, id: &str) {
        self.rejected.lock().unwrap().insert(RecordId::new(id));
    }

    fn mutation_gate(&self, id: &RecordId) -> Arc<Semaphore> {
        let mut gates = self.mutation_gates.lock().unwrap();
        Arc::clone(
            gates
                .entry(id.clone())
                .or_insert_with(|| Arc::new(Semaphore::new(0))),
        )
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

impl DataSource for GatedSource {
    async fn fetch_page(&self, request: PageRequest) -> Result<PageData, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        // The response reflects the server state at request time.
        let data = self.inner.query(&request);
        self.fetch_gate.acquire().await.unwrap().forget();
        Ok(data)
    }

    async fn mutate_status(
        &self,
        id: &RecordId,
        status: RecordStatus,
    ) -> Result<MutationAck, MutationError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let gate = self.mutation_gate(id);
        gate.acquire().await.unwrap().forget();

        let rejected = self.rejected.lock().unwrap().contains(id);
        if rejected {
            return Err(MutationError::rejected("not allowed"));
        }
        self.inner.mutate_status(id, status).await
    }
}

fn records() -> Vec<Record> {
    (1..=12)
        .map(|n| {
            Record::new(format!("u{n}"), RecordStatus::Active)
                .with_field("name", format!("User {n}"))
        })
        .collect()
}

fn setup() -> (Arc<GatedSource>, Arc<QueryCache<GatedSource>>) {
    let source = Arc::new(GatedSource::new(records()));
    let cache = Arc::new(QueryCache::new(Arc::clone(&source), "users"));
    (source, cache)
}

fn first_page() -> ViewParams {
    ViewParams::default()
}

fn status_in(data: &PageData, id: &str) -> RecordStatus {
    data.record(&RecordId::new(id)).expect("record on page").status
}

fn cached_status(cache: &QueryCache<GatedSource>, id: &str) -> RecordStatus {
    status_in(&cache.peek(&first_page()).expect("cached page").value, id)
}

/// Yield to spawned tasks until `condition` holds.
async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

async fn warm(source: &GatedSource, cache: &QueryCache<GatedSource>) {
    source.release_fetches(1);
    cache.get(&first_page()).await.unwrap();
}

#[tokio::test]
async fn concurrent_reads_share_one_fetch() {
    let (source, cache) = setup();

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get(&first_page()).await })
        })
        .collect();

    wait_for(|| cache.is_fetching(&first_page())).await;
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    assert_eq!(source.fetches(), 1);

    source.release_fetches(1);
    let mut pages = Vec::new();
    for reader in readers {
        pages.push(reader.await.unwrap().unwrap());
    }

    assert_eq!(source.fetches(), 1);
    assert!(pages.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(pages[0].total_count, 12);
    assert!(!cache.is_fetching(&first_page()));
}

#[tokio::test]
async fn superseded_reader_follows_the_refetch() {
    let (source, cache) = setup();

    let reader = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.get(&first_page()).await })
    };
    wait_for(|| source.fetches() == 1).await;

    let refetch = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.refetch(&first_page()).await })
    };
    wait_for(|| source.fetches() == 2).await;

    source.release_fetches(2);
    let read = reader.await.unwrap().unwrap();
    let fresh = refetch.await.unwrap().unwrap();

    assert_eq!(read, fresh);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn status_change_is_visible_before_the_server_confirms() {
    let (source, cache) = setup();
    warm(&source, &cache).await;

    let mutation = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache
                .mutate_status(&RecordId::new("u1"), RecordStatus::Inactive)
                .await
        })
    };
    wait_for(|| source.mutations() == 1).await;

    assert_eq!(cached_status(&cache, "u1"), RecordStatus::Inactive);
    assert!(cache.is_mutating(&RecordId::new("u1")));
    assert!(!cache.is_mutating(&RecordId::new("u2")));

    source.release_mutation("u1");
    let ack = mutation.await.unwrap().unwrap();
    assert_eq!(ack.message, "User 1 is now inactive");
    assert!(!cache.is_mutating(&RecordId::new("u1")));

    // Success invalidates the family; the next read refetches.
    assert!(cache.peek(&first_page()).unwrap().invalidated);
    source.release_fetches(1);
    let data = cache.get(&first_page()).await.unwrap();
    assert_eq!(status_in(&data, "u1"), RecordStatus::Inactive);
    assert_eq!(source.fetches(), 2);
}

#[tokio::test]
async fn failed_change_restores_the_prior_page() {
    let (source, cache) = setup();
    warm(&source, &cache).await;
    let before = cache.peek(&first_page()).unwrap().value;
    source.reject("u3");

    let mutation = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache
                .mutate_status(&RecordId::new("u3"), RecordStatus::Inactive)
                .await
        })
    };
    wait_for(|| source.mutations() == 1).await;
    assert_eq!(cached_status(&cache, "u3"), RecordStatus::Inactive);

    source.release_mutation("u3");
    let err = mutation.await.unwrap().unwrap_err();
    assert!(matches!(err, MutationError::Rejected { .. }));

    // Rolled back before any refetch lands.
    let entry = cache.peek(&first_page()).unwrap();
    assert_eq!(entry.value, before);
    assert!(entry.invalidated);
    assert!(!cache.is_mutating(&RecordId::new("u3")));

    source.release_fetches(1);
    let data = cache.get(&first_page()).await.unwrap();
    assert_eq!(status_in(&data, "u3"), RecordStatus::Active);
}

#[tokio::test]
async fn fetch_in_flight_during_mutation_is_discarded() {
    let (source, cache) = setup();
    warm(&source, &cache).await;
    cache.invalidate();

    // A refetch whose response was computed before the write.
    let stale_read = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.get(&first_page()).await })
    };
    wait_for(|| source.fetches() == 2).await;

    let mutation = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache
                .mutate_status(&RecordId::new("u2"), RecordStatus::Inactive)
                .await
        })
    };
    wait_for(|| source.mutations() == 1).await;
    assert!(!cache.is_fetching(&first_page()));

    source.release_mutation("u2");
    mutation.await.unwrap().unwrap();
    assert_eq!(cached_status(&cache, "u2"), RecordStatus::Inactive);

    // The pre-write response is dropped; the reader gets a post-write page.
    source.release_fetches(2);
    let data = stale_read.await.unwrap().unwrap();
    assert_eq!(status_in(&data, "u2"), RecordStatus::Inactive);
    assert_eq!(source.fetches(), 3);
    assert!(!cache.peek(&first_page()).unwrap().invalidated);
}

#[tokio::test]
async fn first_load_survives_an_unrelated_change() {
    let (source, cache) = setup();

    let reader = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.get(&first_page()).await })
    };
    wait_for(|| source.fetches() == 1).await;

    let mutation = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache
                .mutate_status(&RecordId::new("u7"), RecordStatus::Inactive)
                .await
        })
    };
    wait_for(|| source.mutations() == 1).await;
    assert!(!cache.is_fetching(&first_page()));

    // The cancelled fetch settles; the reader starts over instead of failing.
    source.release_fetches(1);
    wait_for(|| source.fetches() == 2).await;
    source.release_fetches(1);
    let data = reader.await.unwrap().unwrap();
    assert_eq!(data.total_count, 12);
    assert_eq!(cache.len(), 1);

    source.release_mutation("u7");
    mutation.await.unwrap().unwrap();
    assert!(cache.peek(&first_page()).unwrap().invalidated);
}

#[tokio::test]
async fn interleaved_outcomes_converge_to_server_state() {
    let (source, cache) = setup();
    warm(&source, &cache).await;
    source.reject("u1");

    let spawn_change = |id: &'static str| {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache
                .mutate_status(&RecordId::new(id), RecordStatus::Inactive)
                .await
        })
    };

    let first = spawn_change("u1");
    wait_for(|| source.mutations() == 1).await;
    let second = spawn_change("u2");
    wait_for(|| source.mutations() == 2).await;
    assert_eq!(cache.pending_mutations(), 2);

    // The later write settles first, then the earlier one fails.
    source.release_mutation("u2");
    second.await.unwrap().unwrap();
    source.release_mutation("u1");
    first.await.unwrap().unwrap_err();

    assert_eq!(cache.pending_mutations(), 0);
    source.release_fetches(1);
    let data = cache.get(&first_page()).await.unwrap();
    assert_eq!(data, source.inner.query(&first_page().page_request()));
    assert_eq!(status_in(&data, "u1"), RecordStatus::Active);
    assert_eq!(status_in(&data, "u2"), RecordStatus::Inactive);
}

#[tokio::test]
async fn many_changes_converge() {
    let (source, cache) = setup();
    warm(&source, &cache).await;
    for id in ["u2", "u5", "u9"] {
        source.reject(id);
    }

    let ids: Vec<String> = (1..=10).map(|n| format!("u{n}")).collect();
    let tasks: Vec<_> = ids
        .iter()
        .map(|id| {
            let cache = Arc::clone(&cache);
            let id = RecordId::new(id.as_str());
            tokio::spawn(async move { cache.mutate_status(&id, RecordStatus::Inactive).await })
        })
        .collect();
    wait_for(|| source.mutations() == ids.len()).await;

    for id in ids.iter().rev() {
        source.release_mutation(id);
    }
    let failures = {
        let mut failures = 0;
        for task in tasks {
            if task.await.unwrap().is_err() {
                failures += 1;
            }
        }
        failures
    };
    assert_eq!(failures, 3);

    source.release_fetches(1);
    let data = cache.get(&first_page()).await.unwrap();
    assert_eq!(data, source.inner.query(&first_page().page_request()));
    assert_eq!(
        data.records
            .iter()
            .filter(|r| r.status == RecordStatus::Inactive)
            .count(),
        7
    );
}

#[tokio::test]
async fn abandoned_change_is_rolled_back() {
    let (source, cache) = setup();
    warm(&source, &cache).await;

    let mutation = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache
                .mutate_status(&RecordId::new("u4"), RecordStatus::Inactive)
                .await
        })
    };
    wait_for(|| source.mutations() == 1).await;
    assert_eq!(cached_status(&cache, "u4"), RecordStatus::Inactive);

    mutation.abort();
    assert!(mutation.await.unwrap_err().is_cancelled());

    assert_eq!(cached_status(&cache, "u4"), RecordStatus::Active);
    assert!(!cache.is_mutating(&RecordId::new("u4")));
}
