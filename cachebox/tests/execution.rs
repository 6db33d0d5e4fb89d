mod common;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cachebox::{CacheError, CachedFetch, EntryState, Fetch, FetchRequest, SortOrder};
use common::{PeopleStore, TestBackend, cached_people, people, registry_with};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn disabled_cache_passes_through() {
    let (cached, store, backend) = cached_people();
    let query = cached.query(people()).unwrap();
    assert!(!query.is_cache_enabled());

    for _ in 0..3 {
        let fetched = query.execute().await.unwrap();
        assert!(!fetched.from_cache);
        assert!(!query.is_from_cache());
    }

    assert_eq!(store.calls(), 3);
    assert_eq!(backend.reads(), 0);
    assert_eq!(backend.writes(), 0);
}

#[tokio::test]
async fn hit_after_miss() {
    let (cached, store, backend) = cached_people();
    let query = cached.query(people()).unwrap();
    query.cache();

    let first = query.execute().await.unwrap();
    assert!(!first.from_cache);
    assert!(!query.is_from_cache());

    let second = query.execute().await.unwrap();
    assert!(second.from_cache);
    assert!(query.is_from_cache());
    assert_eq!(second.value, first.value);

    assert_eq!(store.calls(), 1);
    assert_eq!(backend.writes(), 1);
    assert!(backend.has(query.fingerprint()));
}

#[tokio::test]
async fn stored_value_carries_the_ttl() {
    let (cached, _store, backend) = cached_people();
    let query = cached.query(people()).unwrap();
    query.cache_for(Duration::from_secs(90));
    query.execute().await.unwrap();

    let stored = backend.get_raw(query.fingerprint()).unwrap();
    assert_eq!(stored.ttl(), Some(Duration::from_secs(90)));
}

#[tokio::test]
async fn expired_value_is_a_miss() {
    let (cached, store, _backend) = cached_people();
    let query = cached.query(people()).unwrap();
    query.cache_for(Duration::from_millis(50));

    assert!(!query.execute().await.unwrap().from_cache);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!query.execute().await.unwrap().from_cache);
    assert_eq!(store.calls(), 2);
}

#[tokio::test]
async fn ttl_change_drops_the_stored_value() {
    let (cached, store, backend) = cached_people();
    let query = cached.query(people()).unwrap();
    query.cache_for(Duration::from_secs(60));

    let first = query.execute().await.unwrap();
    assert!(!first.from_cache);
    assert!(query.execute().await.unwrap().from_cache);

    query.cache_for(Duration::from_secs(30));
    assert_eq!(query.state(), EntryState::PendingRecache);

    let refetched = query.execute().await.unwrap();
    assert!(!refetched.from_cache);
    assert_ne!(refetched.value, first.value);
    assert_eq!(backend.removes(), 1);
    assert_eq!(query.state(), EntryState::Enabled);

    let stored = backend.get_raw(query.fingerprint()).unwrap();
    assert_eq!(stored.ttl(), Some(Duration::from_secs(30)));

    assert!(query.execute().await.unwrap().from_cache);
    assert_eq!(store.calls(), 2);
}

#[tokio::test]
async fn fetch_started_before_ttl_change_is_not_stored() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    // Only the first call is slow.
    let fetch = move |_: FetchRequest| {
        let call = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if call == 0 {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            Ok::<_, io::Error>(format!("call {call}"))
        }
    };
    let backend = TestBackend::new();
    let cached = CachedFetch::new(fetch, Arc::new(registry_with(backend.clone())));
    let query = cached.query(people()).unwrap();
    query.cache_for(Duration::from_secs(60));

    let slow = {
        let query = query.clone();
        tokio::spawn(async move { query.execute().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    query.set_ttl(Duration::from_secs(30));
    let fast = query.execute().await.unwrap();
    assert!(!fast.from_cache);
    assert_eq!(fast.value, "call 1");

    let slow = slow.await.unwrap().unwrap();
    assert!(!slow.from_cache);
    assert_eq!(slow.value, "call 0");

    let stored = backend.get_raw(query.fingerprint()).unwrap();
    assert_eq!(stored.ttl(), Some(Duration::from_secs(30)));
    assert_eq!(query.state(), EntryState::Enabled);

    let next = query.execute().await.unwrap();
    assert!(next.from_cache);
    assert_eq!(next.value, "call 1");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn same_ttl_keeps_the_stored_value() {
    let (cached, store, backend) = cached_people();
    let query = cached.query(people()).unwrap();
    query.cache_for(Duration::from_secs(60));
    query.execute().await.unwrap();

    query.cache_for(Duration::from_secs(60));
    assert!(query.execute().await.unwrap().from_cache);
    assert_eq!(store.calls(), 1);
    assert_eq!(backend.removes(), 0);
}

#[tokio::test]
async fn ttl_change_while_disabled_recaches_on_enable() {
    let (cached, store, _backend) = cached_people();
    let query = cached.query(people()).unwrap();
    query.cache();
    query.execute().await.unwrap();

    query.uncache().set_ttl(Duration::from_secs(5));
    assert_eq!(query.state(), EntryState::Disabled);

    query.cache();
    assert_eq!(query.state(), EntryState::PendingRecache);
    assert!(!query.execute().await.unwrap().from_cache);
    assert_eq!(store.calls(), 2);
}

#[tokio::test]
async fn fetch_errors_are_surfaced_and_not_cached() {
    let backend = TestBackend::new();
    let cached = CachedFetch::new(
        PeopleStore::failing(),
        Arc::new(registry_with(backend.clone())),
    );
    let query = cached.query(people()).unwrap();
    query.cache();

    let error = query.execute().await.unwrap_err();
    assert!(matches!(error, CacheError::Fetch(_)));
    assert_eq!(backend.len(), 0);
}

#[tokio::test]
async fn distinct_requests_are_cached_separately() {
    let (cached, store, backend) = cached_people();
    let adults = people().with_filter(json!({ "age": { "$gte": 18 } }));
    let sorted = adults.clone().sort_by("age", SortOrder::Desc);

    for request in [adults.clone(), sorted.clone(), adults, sorted] {
        cached.query(request.clone()).unwrap().cache();
        cached.execute(request).await.unwrap();
    }

    assert_eq!(store.calls(), 2);
    assert_eq!(backend.len(), 2);
}

#[tokio::test]
async fn handles_of_identical_requests_share_state() {
    let (cached, store, _backend) = cached_people();
    let a = cached
        .query(people().with_filter(json!({ "name": "Jacob", "age": 30 })))
        .unwrap();
    let b = cached
        .query(people().with_filter(json!({ "age": 30, "name": "Jacob" })))
        .unwrap();

    a.cache_for(Duration::from_secs(10));
    assert!(b.is_cache_enabled());
    assert_eq!(b.ttl(), Duration::from_secs(10));

    a.execute().await.unwrap();
    assert!(b.execute().await.unwrap().from_cache);
    assert!(a.is_from_cache());

    b.uncache();
    assert!(!a.is_cache_enabled());
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn cached_fetch_is_a_fetch() {
    let (cached, store, _backend) = cached_people();
    cached.query(people()).unwrap().cache();

    async fn run<F: Fetch>(fetch: &F) -> Result<F::Output, F::Error> {
        fetch.fetch(people()).await
    }

    let first = run(&cached).await.unwrap();
    let second = run(&cached).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn cancelled_fetch_writes_nothing() {
    let backend = TestBackend::new();
    let store = PeopleStore::slow(Duration::from_millis(200));
    let cached = CachedFetch::new(store.clone(), Arc::new(registry_with(backend.clone())));
    let query = cached.query(people()).unwrap();
    query.cache();

    let outcome = tokio::time::timeout(Duration::from_millis(20), query.execute()).await;
    assert!(outcome.is_err());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(backend.writes(), 0);
    assert_eq!(backend.len(), 0);
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn zero_ttl_fetches_every_time() {
    let (cached, store, backend) = cached_people();
    let query = cached.query(people()).unwrap();
    query.cache_for(Duration::ZERO);

    assert!(!query.execute().await.unwrap().from_cache);
    assert!(!query.execute().await.unwrap().from_cache);
    assert_eq!(store.calls(), 2);
    assert_eq!(backend.writes(), 0);
}

#[tokio::test]
async fn evict_drops_the_stored_value() {
    let (cached, store, backend) = cached_people();
    let query = cached.query(people()).unwrap();
    query.cache();
    query.execute().await.unwrap();

    query.entry().evict().await.unwrap();
    assert!(!backend.has(query.fingerprint()));
    assert!(!query.execute().await.unwrap().from_cache);
    assert_eq!(store.calls(), 2);
}
