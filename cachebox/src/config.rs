//! Cache defaults and per-namespace policies.
//!
//! [`CacheDefaults`] applies to every controller the registry creates.
//! A [`NamespacePolicy`] overrides the defaults for one namespace. Both are
//! consulted only when a controller is first created: settings made through a
//! [`Query`](crate::Query) handle afterwards always win.
//!
//! Durations are written in human-readable form when deserialized:
//!
//! ```
//! use cachebox::{CacheDefaults, NamespacePolicy};
//! use std::time::Duration;
//!
//! let defaults: CacheDefaults = serde_saphyr::from_str("ttl: 90s\ncache: true").unwrap();
//! assert_eq!(defaults.ttl, Duration::from_secs(90));
//! assert!(defaults.enabled);
//!
//! let policy: NamespacePolicy = serde_saphyr::from_str("expires: 5m").unwrap();
//! assert_eq!(policy.ttl, Some(Duration::from_secs(300)));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// TTL applied when neither the request nor its namespace sets one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Marker type for unset builder fields.
///
/// When you see `NotSet` in a compiler error, the corresponding builder
/// method has not been called yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotSet;

/// Registry-wide cache defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheDefaults {
    /// TTL of new controllers.
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
    /// Whether new controllers start with caching enabled.
    #[serde(alias = "cache")]
    pub enabled: bool,
    /// Serialize concurrent misses on one fingerprint behind a single fetch.
    pub single_flight: bool,
}

impl Default for CacheDefaults {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            enabled: false,
            single_flight: false,
        }
    }
}

/// Cache settings scoped to one namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespacePolicy {
    /// Initial cache-enabled flag for the namespace's controllers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,
    /// Initial TTL for the namespace's controllers.
    #[serde(
        alias = "expires",
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub ttl: Option<Duration>,
}

impl NamespacePolicy {
    /// Policy that enables caching with the given TTL.
    pub fn cached(ttl: Duration) -> Self {
        Self {
            cache: Some(true),
            ttl: Some(ttl),
        }
    }

    /// Policy that disables caching.
    pub fn uncached() -> Self {
        Self {
            cache: Some(false),
            ttl: None,
        }
    }

    /// Sets the initial TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Resolves the policy against registry defaults.
    ///
    /// Returns the initial `(enabled, ttl)` pair of a new controller.
    pub fn resolve(&self, defaults: &CacheDefaults) -> (bool, Duration) {
        (
            self.cache.unwrap_or(defaults.enabled),
            self.ttl.unwrap_or(defaults.ttl),
        )
    }
}
