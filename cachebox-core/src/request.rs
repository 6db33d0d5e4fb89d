//! Description of a single read against the data store.
//!
//! A [`FetchRequest`] carries everything that determines the result of a
//! read: the target [`Namespace`], the read operation, the filter, the
//! projection, the sort order and pagination. Two requests that agree on all
//! of these produce the same [`Fingerprint`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smol_str::SmolStr;

use crate::{Fingerprint, Namespace};

/// Direction of a sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl SortOrder {
    /// Conventional numeric direction (`1` ascending, `-1` descending).
    pub fn direction(self) -> i8 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

/// A read against a data store.
///
/// The filter and projection are free-form JSON documents. Sort fields keep
/// the order they were added in, because the order changes the result.
///
/// # Example
/// ```
/// use cachebox_core::{FetchRequest, SortOrder};
/// use serde_json::json;
///
/// let request = FetchRequest::new("people")
///     .with_filter(json!({ "age": { "$gte": 18 } }))
///     .condition("name", json!("Jacob"))
///     .sort_by("age", SortOrder::Desc)
///     .with_limit(10);
///
/// assert_eq!(request.namespace().as_str(), "people");
/// assert_eq!(request.operation(), "find");
/// assert_eq!(request.filter()["name"], json!("Jacob"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    namespace: Namespace,
    operation: SmolStr,
    filter: Value,
    projection: Option<Value>,
    sort: Vec<(String, SortOrder)>,
    limit: Option<u64>,
    skip: Option<u64>,
}

impl FetchRequest {
    /// Default read operation.
    pub const DEFAULT_OPERATION: &'static str = "find";

    /// Creates a request over the whole namespace with an empty filter.
    pub fn new(namespace: impl Into<Namespace>) -> Self {
        FetchRequest {
            namespace: namespace.into(),
            operation: SmolStr::new_static(Self::DEFAULT_OPERATION),
            filter: Value::Object(Map::new()),
            projection: None,
            sort: Vec::new(),
            limit: None,
            skip: None,
        }
    }

    /// Sets the read operation (`find`, `findOne`, `count`, ...).
    pub fn with_operation(mut self, operation: impl Into<SmolStr>) -> Self {
        self.operation = operation.into();
        self
    }

    /// Replaces the filter document.
    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = filter;
        self
    }

    /// Adds a single field condition to the filter.
    ///
    /// A non-object filter is replaced by an object holding only this condition.
    pub fn condition(mut self, field: impl Into<String>, value: Value) -> Self {
        match &mut self.filter {
            Value::Object(map) => {
                map.insert(field.into(), value);
            }
            other => {
                let mut map = Map::new();
                map.insert(field.into(), value);
                *other = Value::Object(map);
            }
        }
        self
    }

    /// Sets the projection document.
    pub fn with_projection(mut self, projection: Value) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Appends a sort field.
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push((field.into(), order));
        self
    }

    /// Limits the number of returned records.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips the first `skip` records.
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Target namespace.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Read operation name.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Filter document.
    pub fn filter(&self) -> &Value {
        &self.filter
    }

    /// Projection document, if any.
    pub fn projection(&self) -> Option<&Value> {
        self.projection.as_ref()
    }

    /// Sort fields in application order.
    pub fn sort(&self) -> &[(String, SortOrder)] {
        &self.sort
    }

    /// Record limit, if any.
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Number of skipped records, if any.
    pub fn skip(&self) -> Option<u64> {
        self.skip
    }

    /// Deterministic cache identity of this request.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn condition_extends_existing_filter() {
        let request = FetchRequest::new("people")
            .with_filter(json!({ "age": 30 }))
            .condition("name", json!("Jacob"));

        assert_eq!(
            request.filter(),
            &json!({ "age": 30, "name": "Jacob" })
        );
    }

    #[test]
    fn condition_replaces_non_object_filter() {
        let request = FetchRequest::new("people")
            .with_filter(Value::Null)
            .condition("name", json!("Jacob"));

        assert_eq!(request.filter(), &json!({ "name": "Jacob" }));
    }

    #[test]
    fn defaults_to_find_over_everything() {
        let request = FetchRequest::new("people");
        assert_eq!(request.operation(), "find");
        assert_eq!(request.filter(), &json!({}));
        assert!(request.projection().is_none());
        assert!(request.sort().is_empty());
        assert_eq!(request.limit(), None);
        assert_eq!(request.skip(), None);
    }
}
