//! Deterministic cache identity of a fetch request.
//!
//! A [`Fingerprint`] is derived from every field of a [`FetchRequest`] that
//! can change its result. Object keys are sorted recursively before
//! serialization, so two requests whose filters differ only in key order map
//! to the same fingerprint, while requests that differ in any value, in array
//! order or in sort order do not.
//!
//! The textual form is `namespace:canonical-json`. The namespace is also part
//! of the canonical document itself, so fingerprints of different namespaces
//! never collide, even for an empty filter.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{FetchRequest, Namespace};

/// Cache identity of a [`FetchRequest`].
///
/// Cloning is cheap: the key is shared behind an [`Arc`].
///
/// # Example
/// ```
/// use cachebox_core::FetchRequest;
/// use serde_json::json;
///
/// let a = FetchRequest::new("people").with_filter(json!({ "name": "Jacob", "age": 30 }));
/// let b = FetchRequest::new("people").with_filter(json!({ "age": 30, "name": "Jacob" }));
///
/// assert_eq!(a.fingerprint(), b.fingerprint());
/// assert!(a.fingerprint().as_str().starts_with("people:"));
/// ```
#[derive(Clone, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint {
    inner: Arc<FingerprintInner>,
}

#[derive(PartialEq, Eq, Hash, PartialOrd, Ord)]
struct FingerprintInner {
    namespace: Namespace,
    key: Box<str>,
}

impl Fingerprint {
    /// Computes the fingerprint of a request.
    pub fn of(request: &FetchRequest) -> Self {
        let sort = request
            .sort()
            .iter()
            .map(|(field, order)| {
                Value::Array(vec![
                    Value::from(field.as_str()),
                    Value::from(order.direction()),
                ])
            })
            .collect::<Vec<_>>();

        let mut document = Map::new();
        document.insert("ns".to_owned(), Value::from(request.namespace().as_str()));
        document.insert("op".to_owned(), Value::from(request.operation()));
        document.insert("filter".to_owned(), canonicalize(request.filter()));
        if let Some(projection) = request.projection() {
            document.insert("projection".to_owned(), canonicalize(projection));
        }
        if !sort.is_empty() {
            document.insert("sort".to_owned(), Value::Array(sort));
        }
        if let Some(limit) = request.limit() {
            document.insert("limit".to_owned(), Value::from(limit));
        }
        if let Some(skip) = request.skip() {
            document.insert("skip".to_owned(), Value::from(skip));
        }

        let key = format!("{}:{}", request.namespace(), Value::Object(document));
        Fingerprint {
            inner: Arc::new(FingerprintInner {
                namespace: request.namespace().clone(),
                key: key.into_boxed_str(),
            }),
        }
    }

    /// Namespace the fingerprint is scoped to.
    pub fn namespace(&self) -> &Namespace {
        &self.inner.namespace
    }

    /// Full textual key.
    pub fn as_str(&self) -> &str {
        &self.inner.key
    }
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.key)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fingerprint").field(&self.inner.key).finish()
    }
}

impl From<&FetchRequest> for Fingerprint {
    fn from(request: &FetchRequest) -> Self {
        Fingerprint::of(request)
    }
}

/// Rebuilds a JSON value with every object's keys in lexicographic order.
///
/// Insertion order of `serde_json::Map` is preserved, so inserting sorted
/// keys into a fresh map yields a stable serialization.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys = map.keys().collect::<Vec<_>>();
            keys.sort_unstable();
            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                if let Some(inner) = map.get(key) {
                    sorted.insert(key.clone(), canonicalize(inner));
                }
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
