//! Configuration Module
//!
//! Holds the construction-time options of a cache and loads the plain
//! numeric/flag options from environment variables.

use std::env;
use std::fmt;

use tracing::warn;

use crate::cache::{DisposeAfterHook, DisposeHook, SizeCalculation};
use crate::error::{CacheError, Result};

/// Largest integer accepted for any bound (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Default `ttl_resolution` in milliseconds.
pub const DEFAULT_TTL_RESOLUTION: u64 = 1;

/// Cache configuration, immutable once the cache is built.
///
/// A zero in any numeric bound disables that bound. At least one of `max`,
/// `max_size` or `ttl` must be non-zero.
pub struct CacheConfig<K, V> {
    /// Maximum number of entries (0 = no count bound)
    pub max: usize,
    /// Total size budget across all entries (0 = sizes not budgeted)
    pub max_size: usize,
    /// Largest size a single entry may have (0 = falls back to `max_size`)
    pub max_entry_size: usize,
    /// Default TTL in milliseconds (0 = entries never expire)
    pub ttl: u64,
    /// How long a sampled "now" is reused for staleness checks, in milliseconds
    pub ttl_resolution: u64,
    /// Proactively remove stale entries on a timer
    pub ttl_autopurge: bool,
    /// Return stale values from `get`/`peek` instead of nothing
    pub allow_stale: bool,
    /// Keep stale entries in place when `get`/`peek` finds them
    pub no_delete_on_stale_get: bool,
    /// Reset an entry's age on every fresh `get`
    pub update_age_on_get: bool,
    /// Reset an entry's age on every fresh `has`
    pub update_age_on_has: bool,
    /// Overwriting an existing key keeps its original start and ttl
    pub no_update_ttl: bool,
    /// Overwriting an existing key does not dispose the replaced value
    pub no_dispose_on_set: bool,
    /// Derives an entry's size when `set` is not given one
    pub size_calculation: Option<SizeCalculation<K, V>>,
    /// Called synchronously as an entry is removed
    pub dispose: Option<DisposeHook<K, V>>,
    /// Called with removed entries once the mutation that removed them completes
    pub dispose_after: Option<DisposeAfterHook<K, V>>,
}

impl<K, V> CacheConfig<K, V> {
    /// Config bounded only by entry count.
    pub fn with_max(max: usize) -> Self {
        Self {
            max,
            ..Self::default()
        }
    }

    /// Creates a new config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LRU_MAX`, `LRU_MAX_SIZE`, `LRU_MAX_ENTRY_SIZE` - integer bounds (default: 0)
    /// - `LRU_TTL` - default TTL in milliseconds (default: 0)
    /// - `LRU_TTL_RESOLUTION` - staleness clock resolution (default: 1, invalid values ignored)
    /// - `LRU_TTL_AUTOPURGE`, `LRU_ALLOW_STALE`, `LRU_NO_DELETE_ON_STALE_GET`,
    ///   `LRU_UPDATE_AGE_ON_GET`, `LRU_UPDATE_AGE_ON_HAS`, `LRU_NO_UPDATE_TTL`,
    ///   `LRU_NO_DISPOSE_ON_SET` - flags (default: false)
    ///
    /// Malformed integer bounds are reported with the error variant of the
    /// field they were meant for.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |name: &str| lookup(name).and_then(|v| parse_flag(&v)).unwrap_or(false);

        let config = Self {
            max: bound(&lookup, "LRU_MAX", CacheError::InvalidCapacity)?,
            max_size: bound(&lookup, "LRU_MAX_SIZE", CacheError::InvalidMaxSize)?,
            max_entry_size: bound(&lookup, "LRU_MAX_ENTRY_SIZE", CacheError::InvalidMaxEntrySize)?,
            ttl: integer(&lookup, "LRU_TTL", CacheError::InvalidTtl)?.unwrap_or(0),
            ttl_resolution: lookup("LRU_TTL_RESOLUTION")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_TTL_RESOLUTION),
            ttl_autopurge: flag("LRU_TTL_AUTOPURGE"),
            allow_stale: flag("LRU_ALLOW_STALE"),
            no_delete_on_stale_get: flag("LRU_NO_DELETE_ON_STALE_GET"),
            update_age_on_get: flag("LRU_UPDATE_AGE_ON_GET"),
            update_age_on_has: flag("LRU_UPDATE_AGE_ON_HAS"),
            no_update_ttl: flag("LRU_NO_UPDATE_TTL"),
            no_dispose_on_set: flag("LRU_NO_DISPOSE_ON_SET"),
            size_calculation: None,
            dispose: None,
            dispose_after: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Returns true if entries carry a size.
    pub fn tracks_size(&self) -> bool {
        self.max_size > 0 || self.max_entry_size > 0
    }

    /// Checks every bound, failing with the variant of the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.max as u64 > MAX_SAFE_INTEGER {
            return Err(CacheError::InvalidCapacity(format!(
                "max must not exceed {}",
                MAX_SAFE_INTEGER
            )));
        }
        if self.max_size as u64 > MAX_SAFE_INTEGER {
            return Err(CacheError::InvalidMaxSize(format!(
                "max_size must not exceed {}",
                MAX_SAFE_INTEGER
            )));
        }
        if self.max_entry_size as u64 > MAX_SAFE_INTEGER {
            return Err(CacheError::InvalidMaxEntrySize(format!(
                "max_entry_size must not exceed {}",
                MAX_SAFE_INTEGER
            )));
        }
        if self.ttl > MAX_SAFE_INTEGER {
            return Err(CacheError::InvalidTtl(format!(
                "ttl must not exceed {}",
                MAX_SAFE_INTEGER
            )));
        }
        if self.max == 0 && self.max_size == 0 && self.ttl == 0 {
            return Err(CacheError::InvalidCapacity(
                "at least one of max, max_size or ttl is required".to_string(),
            ));
        }
        if self.size_calculation.is_some() && !self.tracks_size() {
            return Err(CacheError::InvalidSizeCalculation(
                "cannot set size_calculation without max_size or max_entry_size".to_string(),
            ));
        }
        if self.max == 0 && self.max_size == 0 && !self.ttl_autopurge {
            warn!("TTL caching without ttl_autopurge, max or max_size can grow without bound");
        }
        Ok(())
    }
}

impl<K, V> Default for CacheConfig<K, V> {
    fn default() -> Self {
        Self {
            max: 0,
            max_size: 0,
            max_entry_size: 0,
            ttl: 0,
            ttl_resolution: DEFAULT_TTL_RESOLUTION,
            ttl_autopurge: false,
            allow_stale: false,
            no_delete_on_stale_get: false,
            update_age_on_get: false,
            update_age_on_has: false,
            no_update_ttl: false,
            no_dispose_on_set: false,
            size_calculation: None,
            dispose: None,
            dispose_after: None,
        }
    }
}

impl<K, V> Clone for CacheConfig<K, V> {
    fn clone(&self) -> Self {
        Self {
            size_calculation: self.size_calculation.clone(),
            dispose: self.dispose.clone(),
            dispose_after: self.dispose_after.clone(),
            ..*self
        }
    }
}

impl<K, V> fmt::Debug for CacheConfig<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("max", &self.max)
            .field("max_size", &self.max_size)
            .field("max_entry_size", &self.max_entry_size)
            .field("ttl", &self.ttl)
            .field("ttl_resolution", &self.ttl_resolution)
            .field("ttl_autopurge", &self.ttl_autopurge)
            .field("allow_stale", &self.allow_stale)
            .field("no_delete_on_stale_get", &self.no_delete_on_stale_get)
            .field("update_age_on_get", &self.update_age_on_get)
            .field("update_age_on_has", &self.update_age_on_has)
            .field("no_update_ttl", &self.no_update_ttl)
            .field("no_dispose_on_set", &self.no_dispose_on_set)
            .field("size_calculation", &self.size_calculation.is_some())
            .field("dispose", &self.dispose.is_some())
            .field("dispose_after", &self.dispose_after.is_some())
            .finish()
    }
}

fn integer<F>(lookup: &F, name: &str, invalid: fn(String) -> CacheError) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| invalid(format!("{}={:?} is not a non-negative integer", name, raw))),
    }
}

/// Integer bound defaulting to 0, rejected if it does not fit a `usize`.
fn bound<F>(lookup: &F, name: &str, invalid: fn(String) -> CacheError) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = integer(lookup, name, invalid)?.unwrap_or(0);
    usize::try_from(raw)
        .map_err(|_| invalid(format!("{}={} does not fit this platform's usize", name, raw)))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
