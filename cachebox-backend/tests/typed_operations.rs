mod common;

use std::sync::Arc;
use std::time::Duration;

use cachebox_backend::{Backend, BackendError, CacheBackend, DeleteStatus, FormatExt, RonFormat};
use cachebox_core::{CacheValue, FetchRequest, Fingerprint, Raw};
use chrono::{TimeDelta, Utc};
use common::test_backend::TestBackend;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Person {
    name: String,
    age: u8,
}

fn jacob() -> Vec<Person> {
    vec![Person {
        name: "Jacob".to_owned(),
        age: 30,
    }]
}

fn key() -> Fingerprint {
    FetchRequest::new("people")
        .with_filter(json!({ "name": "Jacob" }))
        .fingerprint()
}

#[tokio::test]
async fn set_then_get_returns_value_and_metadata() {
    let backend = TestBackend::new();
    let ttl = Duration::from_secs(60);

    backend.set(&key(), &jacob(), Some(ttl)).await.unwrap();

    let cached = backend.get::<Vec<Person>>(&key()).await.unwrap().unwrap();
    assert_eq!(cached.data(), &jacob());
    assert_eq!(cached.ttl(), Some(ttl));
    assert!(!cached.is_expired());
}

#[tokio::test]
async fn get_missing_key_is_none() {
    let backend = TestBackend::new();
    assert!(backend.get::<Vec<Person>>(&key()).await.unwrap().is_none());
}

#[tokio::test]
async fn expired_value_is_reported_absent() {
    let backend = TestBackend::new();
    let raw = backend.value_format().serialize(&jacob()).unwrap();
    backend.put_raw(
        &key(),
        CacheValue::new(
            raw,
            Utc::now() - TimeDelta::seconds(120),
            Some(Duration::from_secs(60)),
        ),
    );

    assert!(backend.has(&key()));
    assert!(backend.get::<Vec<Person>>(&key()).await.unwrap().is_none());
}

#[tokio::test]
async fn undecodable_value_is_a_format_error() {
    let backend = TestBackend::new();
    backend.put_raw(
        &key(),
        CacheValue::fresh(Raw::from_static(b"not json"), None),
    );

    let error = backend.get::<Vec<Person>>(&key()).await.unwrap_err();
    assert!(matches!(error, BackendError::FormatError(_)));
}

#[tokio::test]
async fn delete_reports_status() {
    let backend = TestBackend::new();
    backend.set(&key(), &jacob(), None).await.unwrap();

    assert_eq!(backend.delete(&key()).await.unwrap(), DeleteStatus::Deleted(1));
    assert_eq!(backend.delete(&key()).await.unwrap(), DeleteStatus::Missing);
    assert!(!backend.has(&key()));
}

#[tokio::test]
async fn trait_objects_forward_operations() {
    let backend = TestBackend::new();
    let shared: Arc<dyn Backend> = Arc::new(backend.clone());

    shared.set(&key(), &jacob(), None).await.unwrap();
    assert_eq!(shared.name(), "test");
    assert!(backend.has(&key()));

    let boxed: Box<dyn Backend> = Box::new(backend.clone());
    let cached = boxed.get::<Vec<Person>>(&key()).await.unwrap().unwrap();
    assert_eq!(cached.into_inner(), jacob());
}

#[tokio::test]
async fn stored_bytes_use_the_value_format() {
    let backend = TestBackend::new();
    backend.set(&key(), &jacob(), None).await.unwrap();

    let raw = backend.get_raw(&key()).unwrap();
    let decoded: Vec<Person> = serde_json::from_slice(raw.data()).unwrap();
    assert_eq!(decoded, jacob());
}

#[tokio::test]
async fn custom_value_format_is_used() {
    let raw = RonFormat.serialize(&jacob()).unwrap();
    let decoded: Vec<Person> = RonFormat.deserialize(&raw).unwrap();
    assert_eq!(decoded, jacob());
    assert!(std::str::from_utf8(&raw).unwrap().contains("Jacob"));
}
