//! In-memory test adapters using DashMap.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use cachebox::backend::{Backend, BackendError, BackendResult, CacheBackend, DeleteStatus};
use cachebox::{CacheValue, Fingerprint};
use cachebox_core::Raw;
use dashmap::DashMap;

/// In-memory adapter that counts its operations.
///
/// Never evicts, so expiry is left to the typed read path.
#[derive(Clone, Default)]
pub struct TestBackend {
    store: Arc<DashMap<Fingerprint, CacheValue<Raw>>>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
    removes: Arc<AtomicUsize>,
}

impl TestBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &Fingerprint) -> bool {
        self.store.contains_key(key)
    }

    pub fn get_raw(&self, key: &Fingerprint) -> Option<CacheValue<Raw>> {
        self.store.get(key).map(|v| v.clone())
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn removes(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for TestBackend {
    async fn read(&self, key: &Fingerprint) -> BackendResult<Option<CacheValue<Raw>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.store.get(key).map(|v| v.clone()))
    }

    async fn write(&self, key: &Fingerprint, value: CacheValue<Raw>) -> BackendResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.store.insert(key.clone(), value);
        Ok(())
    }

    async fn remove(&self, key: &Fingerprint) -> BackendResult<DeleteStatus> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        let existed = self.store.remove(key).is_some();
        Ok(if existed {
            DeleteStatus::Deleted(1)
        } else {
            DeleteStatus::Missing
        })
    }

    fn name(&self) -> &str {
        "test"
    }
}

impl CacheBackend for TestBackend {}

/// Adapter over a [`TestBackend`] whose operations can be made to fail.
#[derive(Clone, Default)]
pub struct FailingBackend {
    inner: TestBackend,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    fail_removes: Arc<AtomicBool>,
}

impl FailingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &TestBackend {
        &self.inner
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    fn error(operation: &str) -> BackendError {
        BackendError::connection(io::Error::new(
            io::ErrorKind::ConnectionReset,
            format!("{operation} failed: connection reset"),
        ))
    }
}

#[async_trait]
impl Backend for FailingBackend {
    async fn read(&self, key: &Fingerprint) -> BackendResult<Option<CacheValue<Raw>>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::error("read"));
        }
        self.inner.read(key).await
    }

    async fn write(&self, key: &Fingerprint, value: CacheValue<Raw>) -> BackendResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::error("write"));
        }
        self.inner.write(key, value).await
    }

    async fn remove(&self, key: &Fingerprint) -> BackendResult<DeleteStatus> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(Self::error("remove"));
        }
        self.inner.remove(key).await
    }

    fn name(&self) -> &str {
        "failing"
    }
}

impl CacheBackend for FailingBackend {}
