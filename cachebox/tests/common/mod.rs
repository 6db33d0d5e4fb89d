#![allow(dead_code)]

pub mod test_backend;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cachebox::backend::Backend;
use cachebox::{CachedFetch, Fetch, FetchRequest, Namespace, Registry};
use futures::future::BoxFuture;

pub use test_backend::{FailingBackend, TestBackend};

/// Fetch capability standing in for a database collection.
///
/// Every call returns the request's fingerprint plus a call number, so two
/// fetched values are never equal.
#[derive(Clone, Default)]
pub struct PeopleStore {
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
    fail: bool,
}

impl PeopleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetch for PeopleStore {
    type Output = Vec<String>;
    type Error = io::Error;
    type Future = BoxFuture<'static, Result<Self::Output, Self::Error>>;

    fn fetch(&self, request: FetchRequest) -> Self::Future {
        let calls = Arc::clone(&self.calls);
        let delay = self.delay;
        let fail = self.fail;
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if fail {
                return Err(io::Error::other("database unavailable"));
            }
            Ok(vec![request.fingerprint().to_string(), format!("call {call}")])
        })
    }
}

/// Registry where every namespace shares `backend`.
pub fn registry_with<B>(backend: B) -> Registry
where
    B: Backend + Clone + 'static,
{
    Registry::builder()
        .backends(move |_: &Namespace| Ok(Arc::new(backend.clone()) as Arc<dyn Backend>))
        .build()
}

/// Cached people store over a shared [`TestBackend`].
pub fn cached_people() -> (CachedFetch<PeopleStore>, PeopleStore, TestBackend) {
    let backend = TestBackend::new();
    let store = PeopleStore::new();
    let cached = CachedFetch::new(store.clone(), Arc::new(registry_with(backend.clone())));
    (cached, store, backend)
}

pub fn people() -> FetchRequest {
    FetchRequest::new("people")
}
