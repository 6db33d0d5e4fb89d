//! Namespace identifier for logical data collections.
//!
//! A namespace names one collection of data (a model, a table, a document
//! collection). Every fingerprint is scoped to a namespace and every
//! namespace owns exactly one storage adapter instance.

use smol_str::SmolStr;
use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a logical data collection.
///
/// # Example
/// ```
/// use cachebox_core::Namespace;
///
/// let people = Namespace::new("people");
/// assert_eq!(people.as_str(), "people");
/// assert_eq!(people, Namespace::from("people"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(SmolStr);

impl Namespace {
    /// Creates a new namespace.
    #[inline]
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    /// Creates a namespace from a static string (no allocation).
    #[inline]
    pub const fn new_static(s: &'static str) -> Self {
        Self(SmolStr::new_static(s))
    }

    /// Returns the namespace as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Namespace {
    #[inline]
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

impl From<String> for Namespace {
    #[inline]
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}

impl From<&Namespace> for Namespace {
    #[inline]
    fn from(namespace: &Namespace) -> Self {
        namespace.clone()
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Namespace {
    fn borrow(&self) -> &str {
        &self.0
    }
}
