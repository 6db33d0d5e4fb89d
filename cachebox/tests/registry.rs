mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cachebox::backend::Backend;
use cachebox::{CachedFetch, FetchRequest, Namespace, NamespacePolicy, Registry};
use common::{PeopleStore, TestBackend, people};
use pretty_assertions::assert_eq;
use serde_json::json;

fn counting_registry(created: Arc<AtomicUsize>) -> Registry {
    Registry::builder()
        .backends(move |_: &Namespace| {
            created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(TestBackend::new()) as Arc<dyn Backend>)
        })
        .build()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_converge() {
    let created = Arc::new(AtomicUsize::new(0));
    let registry = Arc::new(counting_registry(Arc::clone(&created)));

    let handles = (0..32)
        .map(|i| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                let entry = registry
                    .entry(&FetchRequest::new("people").with_filter(json!({ "name": "Jacob" })))
                    .unwrap();
                if i == 0 {
                    entry.cache(Some(Duration::from_secs(5)));
                }
                entry
            })
        })
        .collect::<Vec<_>>();

    let mut entries = Vec::new();
    for handle in handles {
        entries.push(handle.await.unwrap());
    }

    let first = &entries[0];
    for entry in &entries {
        assert!(Arc::ptr_eq(first, entry));
        assert!(entry.is_enabled());
        assert_eq!(entry.ttl(), Duration::from_secs(5));
    }
    assert_eq!(registry.entry_count(), 1);
    assert_eq!(created.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn one_adapter_per_namespace() {
    let created = Arc::new(AtomicUsize::new(0));
    let registry = counting_registry(Arc::clone(&created));

    for name in ["Jacob", "Jake", "Joe"] {
        registry
            .entry(&people().condition("name", json!(name)))
            .unwrap();
    }
    registry.entry(&FetchRequest::new("pets")).unwrap();

    assert_eq!(registry.entry_count(), 4);
    assert_eq!(registry.bucket_count(), 2);
    assert_eq!(created.load(Ordering::SeqCst), 2);

    let a = registry.backend(&Namespace::from("people")).unwrap();
    let b = registry.backend(&Namespace::from("people")).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[tokio::test]
async fn namespace_policy_seeds_new_entries() {
    let registry = Registry::builder()
        .default_ttl(Duration::from_secs(20))
        .namespace("people", NamespacePolicy::cached(Duration::from_secs(90)))
        .backends(|_: &Namespace| Ok(Arc::new(TestBackend::new()) as Arc<dyn Backend>))
        .build();
    registry.set_policy("pets", NamespacePolicy::default().with_ttl(Duration::from_secs(7)));

    let people = registry.entry(&people()).unwrap();
    assert!(people.is_enabled());
    assert_eq!(people.ttl(), Duration::from_secs(90));

    let pets = registry.entry(&FetchRequest::new("pets")).unwrap();
    assert!(!pets.is_enabled());
    assert_eq!(pets.ttl(), Duration::from_secs(7));

    let places = registry.entry(&FetchRequest::new("places")).unwrap();
    assert!(!places.is_enabled());
    assert_eq!(places.ttl(), Duration::from_secs(20));
}

#[tokio::test]
async fn request_settings_override_the_namespace_policy() {
    let registry = Registry::builder()
        .namespace("people", NamespacePolicy::cached(Duration::from_secs(90)))
        .backends(|_: &Namespace| Ok(Arc::new(TestBackend::new()) as Arc<dyn Backend>))
        .build();
    let cached = CachedFetch::new(PeopleStore::new(), Arc::new(registry));

    let query = cached.query(people()).unwrap();
    query.uncache();

    let again = cached.query(people()).unwrap();
    assert!(!again.is_cache_enabled());
    assert_eq!(again.ttl(), Duration::from_secs(90));
}

#[tokio::test]
async fn enabled_by_default_caches_without_opt_in() {
    let backend = TestBackend::new();
    let shared = backend.clone();
    let registry = Registry::builder()
        .enabled_by_default(true)
        .backends(move |_: &Namespace| Ok(Arc::new(shared.clone()) as Arc<dyn Backend>))
        .build();
    let store = PeopleStore::new();
    let cached = CachedFetch::new(store.clone(), Arc::new(registry));

    assert!(!cached.execute(people()).await.unwrap().from_cache);
    assert!(cached.execute(people()).await.unwrap().from_cache);
    assert_eq!(store.calls(), 1);
    assert_eq!(backend.writes(), 1);
}

#[tokio::test]
async fn evict_and_reset_forget_entries() {
    let created = Arc::new(AtomicUsize::new(0));
    let registry = counting_registry(Arc::clone(&created));

    let entry = registry.entry(&people()).unwrap();
    entry.cache(Some(Duration::from_secs(5)));
    assert!(registry.get(entry.fingerprint()).is_some());

    let evicted = registry.evict(entry.fingerprint()).unwrap();
    assert!(Arc::ptr_eq(&evicted, &entry));
    assert!(registry.get(entry.fingerprint()).is_none());

    let fresh = registry.entry(&people()).unwrap();
    assert!(!Arc::ptr_eq(&fresh, &entry));
    assert!(!fresh.is_enabled());

    registry.reset();
    assert_eq!(registry.entry_count(), 0);
    assert_eq!(registry.bucket_count(), 0);

    registry.entry(&people()).unwrap();
    assert_eq!(created.load(Ordering::SeqCst), 2);
}
