//! Per-call Options Module
//!
//! Every access-policy flag set on the cache can be overridden for a single
//! call. Unset fields (`None`) fall back to the cache's [`Policy`].

use std::fmt;

use crate::cache::SizeCalculation;
use crate::config::CacheConfig;

// == Policy ==
/// The instance-wide defaults per-call options are merged against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Policy {
    pub ttl: u64,
    pub allow_stale: bool,
    pub no_delete_on_stale_get: bool,
    pub update_age_on_get: bool,
    pub update_age_on_has: bool,
    pub no_update_ttl: bool,
    pub no_dispose_on_set: bool,
}

impl<K, V> From<&CacheConfig<K, V>> for Policy {
    fn from(config: &CacheConfig<K, V>) -> Self {
        Self {
            ttl: config.ttl,
            allow_stale: config.allow_stale,
            no_delete_on_stale_get: config.no_delete_on_stale_get,
            update_age_on_get: config.update_age_on_get,
            update_age_on_has: config.update_age_on_has,
            no_update_ttl: config.no_update_ttl,
            no_dispose_on_set: config.no_dispose_on_set,
        }
    }
}

// == Get ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOptions {
    pub allow_stale: Option<bool>,
    pub update_age_on_get: Option<bool>,
    pub no_delete_on_stale_get: Option<bool>,
}

impl GetOptions {
    /// Shorthand for a call that accepts stale values.
    pub fn allow_stale() -> Self {
        Self {
            allow_stale: Some(true),
            ..Self::default()
        }
    }
}

// == Peek ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeekOptions {
    pub allow_stale: Option<bool>,
    pub no_delete_on_stale_get: Option<bool>,
}

// == Has ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HasOptions {
    pub update_age_on_has: Option<bool>,
}

// == Iteration ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterOptions {
    /// Include stale entries
    pub allow_stale: bool,
}

// == Set ==
pub struct SetOptions<K, V> {
    /// TTL for this entry in milliseconds (0 = never expires)
    pub ttl: Option<u64>,
    /// Admission time to record instead of "now", in clock milliseconds
    pub start: Option<i64>,
    /// Explicit entry size
    pub size: Option<usize>,
    /// Size calculation for this call only
    pub size_calculation: Option<SizeCalculation<K, V>>,
    pub no_update_ttl: Option<bool>,
    pub no_dispose_on_set: Option<bool>,
}

impl<K, V> SetOptions<K, V> {
    pub fn ttl(ttl: u64) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    pub fn size(size: usize) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }
}

impl<K, V> Default for SetOptions<K, V> {
    fn default() -> Self {
        Self {
            ttl: None,
            start: None,
            size: None,
            size_calculation: None,
            no_update_ttl: None,
            no_dispose_on_set: None,
        }
    }
}

impl<K, V> Clone for SetOptions<K, V> {
    fn clone(&self) -> Self {
        Self {
            size_calculation: self.size_calculation.clone(),
            ..*self
        }
    }
}

impl<K, V> fmt::Debug for SetOptions<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetOptions")
            .field("ttl", &self.ttl)
            .field("start", &self.start)
            .field("size", &self.size)
            .field("size_calculation", &self.size_calculation.is_some())
            .field("no_update_ttl", &self.no_update_ttl)
            .field("no_dispose_on_set", &self.no_dispose_on_set)
            .finish()
    }
}

// == Resolved Forms ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReadPolicy {
    pub allow_stale: bool,
    pub no_delete_on_stale_get: bool,
    pub update_age: bool,
}

impl Policy {
    pub(crate) fn get(&self, opts: GetOptions) -> ReadPolicy {
        ReadPolicy {
            allow_stale: opts.allow_stale.unwrap_or(self.allow_stale),
            no_delete_on_stale_get: opts
                .no_delete_on_stale_get
                .unwrap_or(self.no_delete_on_stale_get),
            update_age: opts.update_age_on_get.unwrap_or(self.update_age_on_get),
        }
    }

    pub(crate) fn peek(&self, opts: PeekOptions) -> ReadPolicy {
        ReadPolicy {
            allow_stale: opts.allow_stale.unwrap_or(self.allow_stale),
            no_delete_on_stale_get: opts
                .no_delete_on_stale_get
                .unwrap_or(self.no_delete_on_stale_get),
            update_age: false,
        }
    }

    pub(crate) fn has(&self, opts: HasOptions) -> bool {
        opts.update_age_on_has.unwrap_or(self.update_age_on_has)
    }
}
