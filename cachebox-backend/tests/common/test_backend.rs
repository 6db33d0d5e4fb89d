//! Simple in-memory test backend implementation using DashMap.

use async_trait::async_trait;
use cachebox_backend::{Backend, BackendResult, CacheBackend, DeleteStatus};
use cachebox_core::{CacheValue, Fingerprint, Raw};
use dashmap::DashMap;
use std::sync::Arc;

/// Simple in-memory backend for testing using DashMap.
///
/// Stores raw values as-is and never evicts, so expiry checks are left to
/// the typed layer.
#[derive(Clone, Default)]
pub struct TestBackend {
    store: Arc<DashMap<Fingerprint, CacheValue<Raw>>>,
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

    pub fn put_raw(&self, key: &Fingerprint, value: CacheValue<Raw>) {
        self.store.insert(key.clone(), value);
    }
}

#[async_trait]
impl Backend for TestBackend {
    async fn read(&self, key: &Fingerprint) -> BackendResult<Option<CacheValue<Raw>>> {
        Ok(self.store.get(key).map(|v| v.clone()))
    }

    async fn write(&self, key: &Fingerprint, value: CacheValue<Raw>) -> BackendResult<()> {
        self.store.insert(key.clone(), value);
        Ok(())
    }

    async fn remove(&self, key: &Fingerprint) -> BackendResult<DeleteStatus> {
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
