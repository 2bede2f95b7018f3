//! Integration Tests for the LRU Cache
//!
//! Drives the public API end to end. Time comes from a `ManualClock` so TTL
//! behavior is exact.

use std::sync::{Arc, Mutex, Once};

use mini_lru::cache::{
    DisposeReason, Dump, GetOptions, HasOptions, IterOptions, PeekOptions, SetOptions,
};
use mini_lru::{CacheConfig, CacheError, LruCache, ManualClock, RemainingTtl};

// == Helper Functions ==

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn timed_cache(config: CacheConfig<u32, u32>) -> (ManualClock, LruCache<u32, u32>) {
    let clock = ManualClock::new(1_000);
    let cache = LruCache::with_clock(config, clock.clone()).unwrap();
    (clock, cache)
}

fn ttl_config(max: usize, ttl: u64) -> CacheConfig<u32, u32> {
    CacheConfig {
        ttl,
        ttl_resolution: 0,
        ..CacheConfig::with_max(max)
    }
}

fn pairs(cache: &LruCache<u32, u32>) -> Vec<(u32, u32)> {
    cache.entries().map(|(k, v)| (*k, *v)).collect()
}

// == Basic Operation Tests ==

#[test]
fn test_basic_operation() {
    init_tracing();
    let mut cache: LruCache<u32, u32> = LruCache::new(CacheConfig::with_max(10)).unwrap();

    for i in 0..5 {
        cache.set(i, i).unwrap();
    }
    for i in 0..5 {
        assert_eq!(cache.get(&i), Some(i));
    }
    assert_eq!(cache.len(), 5);
    assert_eq!(cache.get_remaining_ttl(&1), RemainingTtl::Unbounded);
    assert_eq!(cache.get_remaining_ttl(&99), RemainingTtl::Millis(0));

    for i in 5..10 {
        cache.set(i, i).unwrap();
    }
    assert_eq!(cache.len(), 10);

    // No TTL, so refreshing the age changes nothing
    for i in 0..5 {
        cache.get_with(
            &i,
            GetOptions {
                update_age_on_get: Some(true),
                ..GetOptions::default()
            },
        );
    }
    assert_eq!(cache.len(), 10);
    assert_eq!(
        cache.keys().copied().collect::<Vec<_>>(),
        vec![4, 3, 2, 1, 0, 9, 8, 7, 6, 5]
    );

    for i in 5..10 {
        cache.get(&i);
    }
    for i in 10..15 {
        cache.set(i, i).unwrap();
    }
    assert_eq!(cache.len(), 10);
    assert_eq!(
        cache.keys().copied().collect::<Vec<_>>(),
        vec![14, 13, 12, 11, 10, 9, 8, 7, 6, 5]
    );

    for i in 15..20 {
        cache.set(i, i).unwrap();
    }
    assert_eq!(cache.len(), 10);
    for i in 0..10 {
        assert_eq!(cache.get(&i), None);
    }

    for i in 0..9 {
        cache.set(i, i).unwrap();
    }
    assert_eq!(cache.len(), 10);
    assert!(cache.delete(&19));
    assert!(!cache.delete(&19));
    assert_eq!(cache.len(), 9);
    cache.set(10, 10).unwrap();
    assert_eq!(cache.len(), 10);

    cache.clear();
    assert_eq!(cache.len(), 0);
    for i in 0..10 {
        cache.set(i, i).unwrap();
    }
    assert_eq!(cache.len(), 10);
    assert!(cache.has(&0));
}

#[test]
fn test_peek_does_not_disturb_order() {
    let mut cache: LruCache<u32, u32> = LruCache::new(CacheConfig::with_max(5)).unwrap();
    for i in 0..5 {
        cache.set(i, i).unwrap();
    }

    assert_eq!(cache.peek(&2), Some(2));
    assert_eq!(
        cache.values().copied().collect::<Vec<_>>(),
        vec![4, 3, 2, 1, 0]
    );
}

#[test]
fn test_reuse_key_before_initial_fill() {
    let mut cache: LruCache<u32, u32> = LruCache::new(CacheConfig::with_max(5)).unwrap();
    cache.set(0, 0).unwrap();
    cache.set(1, 1).unwrap();
    cache.set(2, 2).unwrap();
    cache.set(1, 2).unwrap();
    cache.set(3, 3).unwrap();

    assert_eq!(pairs(&cache), vec![(3, 3), (1, 2), (2, 2), (0, 0)]);
    assert_eq!(
        cache.rkeys().copied().collect::<Vec<_>>(),
        vec![0, 2, 1, 3]
    );
}

#[test]
fn test_string_keys_and_values() {
    let mut cache: LruCache<String, String> = LruCache::new(CacheConfig::with_max(2)).unwrap();

    cache.set("a".to_string(), "1".to_string()).unwrap();
    cache.set("b".to_string(), "2".to_string()).unwrap();
    cache.get("a");
    cache.set("c".to_string(), "3".to_string()).unwrap();

    assert!(cache.has("a"));
    assert!(!cache.has("b"));
    assert_eq!(cache.get("c"), Some("3".to_string()));
}

// == Configuration Error Tests ==

#[test]
fn test_bad_bounds_are_rejected() {
    let unbounded = LruCache::<u32, u32>::new(CacheConfig::default());
    assert!(matches!(unbounded, Err(CacheError::InvalidCapacity(_))));

    let too_large = LruCache::<u32, u32>::new(CacheConfig::with_max(1 << 54));
    assert!(matches!(too_large, Err(CacheError::InvalidCapacity(_))));

    let bad_ttl = LruCache::<u32, u32>::new(CacheConfig {
        ttl: u64::MAX,
        ..CacheConfig::with_max(10)
    });
    assert!(matches!(bad_ttl, Err(CacheError::InvalidTtl(_))));

    let bad_max_size = LruCache::<u32, u32>::new(CacheConfig {
        max_size: 1 << 60,
        ..CacheConfig::with_max(10)
    });
    assert!(matches!(bad_max_size, Err(CacheError::InvalidMaxSize(_))));

    let bad_entry_size = LruCache::<u32, u32>::new(CacheConfig {
        max_entry_size: 1 << 60,
        ..CacheConfig::with_max(10)
    });
    assert!(matches!(
        bad_entry_size,
        Err(CacheError::InvalidMaxEntrySize(_))
    ));

    let stray_calculation = LruCache::<u32, u32>::new(CacheConfig {
        size_calculation: Some(Arc::new(|_: &u32, _: &u32| 1)),
        ..CacheConfig::with_max(1)
    });
    assert!(matches!(
        stray_calculation,
        Err(CacheError::InvalidSizeCalculation(_))
    ));
}

#[test]
fn test_bad_sizes_are_rejected() {
    let mut size_only: LruCache<String, String> = LruCache::new(CacheConfig {
        max_size: 100,
        ..CacheConfig::default()
    })
    .unwrap();

    let foo = || "foo".to_string();
    assert!(matches!(
        size_only.set(foo(), foo()),
        Err(CacheError::InvalidSize(_))
    ));
    assert!(matches!(
        size_only.set_with(foo(), foo(), SetOptions::size(0)),
        Err(CacheError::InvalidSize(_))
    ));
    assert!(matches!(
        size_only.set_with(
            foo(),
            foo(),
            SetOptions {
                size_calculation: Some(Arc::new(|_: &String, _: &String| 0)),
                ..SetOptions::default()
            }
        ),
        Err(CacheError::InvalidSize(_))
    ));

    let mut ttl_only: LruCache<String, String> = LruCache::new(CacheConfig {
        ttl: 1_000,
        ttl_autopurge: true,
        ..CacheConfig::default()
    })
    .unwrap();
    assert!(matches!(
        ttl_only.set_with(foo(), foo(), SetOptions::size(1)),
        Err(CacheError::InvalidSize(_))
    ));

    let size_and_ttl = LruCache::<String, String>::new(CacheConfig {
        max_size: 100,
        ttl: 1_000,
        ..CacheConfig::default()
    });
    assert!(size_and_ttl.is_ok());
}

// == TTL Tests ==

#[test]
fn test_ttl_defaults() {
    let (clock, mut cache) = timed_cache(ttl_config(5, 10));

    cache.set(1, 1).unwrap();
    assert_eq!(cache.get(&1), Some(1));
    clock.advance(5);
    assert_eq!(cache.get(&1), Some(1));
    assert_eq!(cache.get_remaining_ttl(&1), RemainingTtl::Millis(5));
    assert_eq!(cache.get_remaining_ttl(&42), RemainingTtl::Millis(0));
    clock.advance(5);
    assert_eq!(cache.get(&1), Some(1));
    assert_eq!(cache.get_remaining_ttl(&1), RemainingTtl::Millis(0));
    clock.advance(1);
    assert_eq!(cache.get_remaining_ttl(&1), RemainingTtl::Millis(-1));
    clock.advance(1);
    assert_eq!(cache.get_remaining_ttl(&1), RemainingTtl::Millis(-2));
    assert!(!cache.has(&1));
    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.len(), 0);

    cache.set_with(2, 2, SetOptions::ttl(100)).unwrap();
    clock.advance(50);
    assert!(cache.has(&2));
    assert_eq!(cache.get(&2), Some(2));
    clock.advance(51);
    assert!(!cache.has(&2));
    assert_eq!(cache.get(&2), None);

    cache.clear();
    for i in 0..9 {
        cache.set(i, i).unwrap();
    }
    clock.advance(11);
    assert_eq!(cache.peek(&4), None);
    assert!(!cache.has(&4));
    assert_eq!(cache.get(&4), None);

    // An explicit ttl of 0 never expires
    cache.set_with(100, 100, SetOptions::ttl(0)).unwrap();
    clock.advance(100);
    assert_eq!(cache.get_remaining_ttl(&100), RemainingTtl::Unbounded);
    assert_eq!(cache.get(&100), Some(100));
    clock.advance(100);
    assert_eq!(cache.get(&100), Some(100));
}

#[test]
fn test_ttl_resolution_reuses_sampled_time() {
    let (clock, mut cache) = timed_cache(CacheConfig {
        ttl: 10,
        ttl_resolution: 100,
        ..CacheConfig::with_max(10)
    });

    cache.set(1, 1).unwrap();
    assert_eq!(cache.get(&1), Some(1));
    clock.advance(5);
    assert_eq!(cache.get(&1), Some(1));
    clock.advance(5);
    assert_eq!(cache.get(&1), Some(1));
    clock.advance(1);
    // Still judged against the sample taken at the first get
    assert!(cache.has(&1));
    assert_eq!(cache.get(&1), Some(1));
    clock.advance(100);
    assert!(!cache.has(&1));
    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_ttl_autopurge_via_tick() {
    let (clock, mut cache) = timed_cache(CacheConfig {
        ttl: 10,
        ttl_autopurge: true,
        ttl_resolution: 0,
        ..CacheConfig::default()
    });

    cache.set(1, 1).unwrap();
    cache.set(2, 2).unwrap();
    assert_eq!(cache.len(), 2);
    cache.set_with(2, 3, SetOptions::ttl(11)).unwrap();

    clock.advance(11);
    cache.tick();
    assert_eq!(cache.len(), 1);
    clock.advance(1);
    cache.tick();
    assert_eq!(cache.len(), 0);
    assert_eq!(cache.next_purge_in(), None);
}

#[test]
fn test_ttl_on_set_not_on_cache() {
    let (clock, mut cache) = timed_cache(ttl_config(5, 0));

    cache.set_with(1, 1, SetOptions::ttl(10)).unwrap();
    assert_eq!(cache.get(&1), Some(1));
    clock.advance(10);
    assert_eq!(cache.get(&1), Some(1));
    clock.advance(1);
    assert!(!cache.has(&1));
    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.len(), 0);

    for i in 0..9 {
        cache.set_with(i, i, SetOptions::ttl(10)).unwrap();
    }
    clock.advance(11);
    assert!(!cache.has(&4));
    assert_eq!(cache.get(&4), None);
}

#[test]
fn test_ttl_with_allow_stale() {
    let (clock, mut cache) = timed_cache(CacheConfig {
        allow_stale: true,
        ..ttl_config(5, 10)
    });

    cache.set(1, 1).unwrap();
    clock.advance(10);
    assert_eq!(cache.get(&1), Some(1));
    clock.advance(1);
    assert!(!cache.has(&1));
    // Returned once, then gone
    assert_eq!(cache.get(&1), Some(1));
    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.len(), 0);

    cache.set_with(2, 2, SetOptions::ttl(100)).unwrap();
    clock.advance(101);
    assert!(!cache.has(&2));
    assert_eq!(cache.get(&2), Some(2));
    assert_eq!(cache.get(&2), None);
}

#[test]
fn test_update_age_on_get_and_has() {
    let (clock, mut cache) = timed_cache(CacheConfig {
        update_age_on_get: true,
        update_age_on_has: true,
        ..ttl_config(5, 10)
    });

    cache.set(1, 1).unwrap();
    assert_eq!(cache.get(&1), Some(1));
    clock.advance(5);
    assert!(cache.has(&1));
    clock.advance(5);
    assert_eq!(cache.get(&1), Some(1));
    clock.advance(1);
    assert_eq!(cache.get_remaining_ttl(&1), RemainingTtl::Millis(9));
    assert!(cache.has(&1));
    assert_eq!(cache.get_remaining_ttl(&1), RemainingTtl::Millis(10));
    assert_eq!(cache.len(), 1);
    cache.clear();

    cache.set_with(2, 2, SetOptions::ttl(100)).unwrap();
    for _ in 0..10 {
        clock.advance(50);
        assert!(cache.has(&2));
        assert_eq!(cache.get(&2), Some(2));
    }
    clock.advance(101);
    assert!(!cache.has(&2));
    assert_eq!(cache.get(&2), None);

    // Per-call overrides win over the cache defaults
    cache.set(3, 3).unwrap();
    clock.advance(6);
    cache.has_with(
        &3,
        HasOptions {
            update_age_on_has: Some(false),
        },
    );
    assert_eq!(cache.get_remaining_ttl(&3), RemainingTtl::Millis(4));
}

#[test]
fn test_purge_stale() {
    let (clock, mut cache) = timed_cache(ttl_config(10, 0));
    for i in 0..10 {
        cache.set_with(i, i, SetOptions::ttl(i as u64 + 1)).unwrap();
    }

    clock.advance(3);
    assert_eq!(cache.len(), 10);
    assert!(cache.purge_stale());
    assert_eq!(cache.len(), 8);
    assert!(!cache.purge_stale());

    clock.advance(100);
    assert_eq!(cache.len(), 8);
    assert!(cache.purge_stale());
    assert_eq!(cache.len(), 0);
    assert!(!cache.purge_stale());
    assert_eq!(cache.stats().expirations, 10);
}

#[test]
fn test_no_update_ttl() {
    let (clock, mut cache) = timed_cache(CacheConfig {
        no_update_ttl: true,
        ..ttl_config(10, 10)
    });
    for i in 0..3 {
        cache.set(i, i).unwrap();
    }
    clock.advance(9);
    cache.set(0, 0).unwrap();
    cache
        .set_with(
            1,
            1,
            SetOptions {
                no_update_ttl: Some(false),
                ..SetOptions::default()
            },
        )
        .unwrap();
    clock.advance(9);
    cache.purge_stale();

    assert_eq!(cache.get(&2), None, "fell out of cache normally");
    assert_eq!(cache.get(&1), Some(1), "ttl was updated");
    assert_eq!(cache.get(&0), None, "fell out despite the update");

    clock.advance(9);
    cache.purge_stale();
    assert_eq!(cache.get(&1), None);
}

#[test]
fn test_indexes_walk_over_stale_entries() {
    let (clock, mut cache) = timed_cache(CacheConfig {
        ttl: 10,
        ..CacheConfig::with_max(10)
    });
    for i in 0..3 {
        cache.set(i, i).unwrap();
    }
    clock.advance(9);
    for i in 3..10 {
        cache.set(i, i).unwrap();
    }
    cache.get(&1);
    cache.get(&3);
    clock.advance(9);

    let stale = IterOptions { allow_stale: true };
    assert_eq!(
        cache.indexes(IterOptions::default()).collect::<Vec<_>>(),
        vec![3, 9, 8, 7, 6, 5, 4]
    );
    assert_eq!(
        cache.indexes(stale).collect::<Vec<_>>(),
        vec![3, 1, 9, 8, 7, 6, 5, 4, 2, 0]
    );
    assert_eq!(
        cache.rindexes(IterOptions::default()).collect::<Vec<_>>(),
        vec![4, 5, 6, 7, 8, 9, 3]
    );
    assert_eq!(
        cache.rindexes(stale).collect::<Vec<_>>(),
        vec![0, 2, 4, 5, 6, 7, 8, 9, 1, 3]
    );
    // Walking never removes anything
    assert_eq!(cache.len(), 10);
}

#[test]
fn test_clear_disposes_stale_entries() {
    type Log = Arc<Mutex<Vec<(u32, u32)>>>;
    let disposed: Log = Arc::default();
    let disposed_after: Log = Arc::default();
    let sink = disposed.clone();
    let after_sink = disposed_after.clone();

    let (clock, mut cache) = timed_cache(CacheConfig {
        ttl: 10,
        dispose: Some(Arc::new(move |v: &u32, k: &u32, _: DisposeReason| {
            sink.lock().unwrap().push((*v, *k))
        })),
        dispose_after: Some(Arc::new(move |v: u32, k: u32, _: DisposeReason| {
            after_sink.lock().unwrap().push((v, k))
        })),
        ..CacheConfig::with_max(3)
    });

    for i in 0..4 {
        cache.set(i, i).unwrap();
    }
    assert_eq!(*disposed.lock().unwrap(), vec![(0, 0)]);
    assert_eq!(*disposed_after.lock().unwrap(), vec![(0, 0)]);

    clock.advance(20);
    cache.clear();
    let expected = vec![(0, 0), (1, 1), (2, 2), (3, 3)];
    assert_eq!(*disposed.lock().unwrap(), expected);
    assert_eq!(*disposed_after.lock().unwrap(), expected);
}

#[test]
fn test_purge_stale_after_age_refresh() {
    let (clock, mut cache) = timed_cache(CacheConfig {
        ttl: 10,
        update_age_on_get: true,
        ..CacheConfig::with_max(3)
    });
    cache.set(1, 1).unwrap();
    cache.set(2, 2).unwrap();
    cache.set(3, 3).unwrap();
    clock.advance(5);
    cache.get(&2);
    clock.advance(15);

    assert!(cache.purge_stale());
    assert!(cache.is_empty());
}

#[test]
fn test_set_item_pre_stale_and_reload() {
    let config = || CacheConfig::<u32, u32> {
        ttl: 10,
        allow_stale: true,
        ..CacheConfig::with_max(3)
    };
    let clock = ManualClock::new(1_000);
    let mut cache = LruCache::with_clock(config(), clock.clone()).unwrap();

    cache.set(1, 1).unwrap();
    assert!(cache.has(&1));
    assert_eq!(cache.get(&1), Some(1));

    let pre_stale = || SetOptions {
        start: Some(1_000 - 11),
        ..SetOptions::default()
    };
    cache.set_with(2, 2, pre_stale()).unwrap();
    assert!(!cache.has(&2));
    assert_eq!(cache.get(&2), Some(2));
    assert_eq!(cache.get(&2), None);

    cache.set_with(2, 2, pre_stale()).unwrap();
    let dump = cache.dump();
    assert_eq!(dump.len(), 2);
    assert_eq!(dump[0].0, 2);
    assert_eq!(dump[0].1.ttl, Some(10));
    assert_eq!(dump[0].1.age, Some(11));
    assert_eq!(dump[0].1.remaining_ttl(), Some(-1));

    // Dumps survive a trip through JSON
    let json = serde_json::to_string(&dump).unwrap();
    let dump: Dump<u32, u32> = serde_json::from_str(&json).unwrap();

    let mut restored = LruCache::with_clock(config(), clock.clone()).unwrap();
    restored.load(dump).unwrap();
    assert!(!restored.has(&2));
    assert_eq!(restored.get(&2), Some(2));
    assert_eq!(restored.get(&2), None);
    assert_eq!(restored.get(&1), Some(1));
}

#[test]
fn test_failed_load_leaves_cache_untouched() {
    let mut sized: LruCache<u32, u32> = LruCache::new(CacheConfig {
        max_size: 100,
        ..CacheConfig::default()
    })
    .unwrap();
    sized.set_with(1, 1, SetOptions::size(3)).unwrap();
    sized.set_with(2, 2, SetOptions::size(4)).unwrap();
    let sized_dump = sized.dump();

    let disposed = Arc::new(Mutex::new(0));
    let sink = disposed.clone();
    let (_, mut cache) = timed_cache(CacheConfig {
        dispose: Some(Arc::new(move |_: &u32, _: &u32, _: DisposeReason| {
            *sink.lock().unwrap() += 1
        })),
        ..CacheConfig::with_max(5)
    });
    cache.set(7, 70).unwrap();

    // Sizes cannot be loaded into a cache that does not track them
    assert!(matches!(
        cache.load(sized_dump),
        Err(CacheError::InvalidSize(_))
    ));
    assert_eq!(pairs(&cache), vec![(7, 70)]);
    assert_eq!(*disposed.lock().unwrap(), 0);

    let mut bad_ttl = cache.dump();
    bad_ttl.push((8, bad_ttl[0].1.clone()));
    bad_ttl[1].1.ttl = Some(u64::MAX);
    assert!(matches!(cache.load(bad_ttl), Err(CacheError::InvalidTtl(_))));
    assert_eq!(pairs(&cache), vec![(7, 70)]);
    assert_eq!(*disposed.lock().unwrap(), 0);
}

#[test]
fn test_no_delete_on_stale_get() {
    let (clock, mut cache) = timed_cache(CacheConfig {
        no_delete_on_stale_get: true,
        ..ttl_config(3, 10)
    });

    cache.set(1, 1).unwrap();
    clock.advance(11);
    assert!(!cache.has(&1));
    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.get_with(&1, GetOptions::allow_stale()), Some(1));
    assert_eq!(
        cache.get_with(
            &1,
            GetOptions {
                allow_stale: Some(true),
                no_delete_on_stale_get: Some(false),
                ..GetOptions::default()
            }
        ),
        Some(1)
    );
    assert_eq!(cache.get_with(&1, GetOptions::allow_stale()), None);
}

#[test]
fn test_peek_with_allow_stale_keeps_order() {
    let (clock, mut cache) = timed_cache(ttl_config(3, 10));

    cache.set(1, 1).unwrap();
    cache.set_with(2, 2, SetOptions::ttl(0)).unwrap();
    clock.advance(11);

    let peek = PeekOptions {
        allow_stale: Some(true),
        no_delete_on_stale_get: Some(true),
    };
    assert_eq!(cache.peek_with(&1, peek), Some(1));
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.peek(&1), None);
    assert_eq!(cache.len(), 1);
    assert_eq!(pairs(&cache), vec![(2, 2)]);
}

// == Size Budget Tests ==

#[test]
fn test_size_budget_with_hooks() {
    let reasons: Arc<Mutex<Vec<(String, DisposeReason)>>> = Arc::default();
    let sink = reasons.clone();
    let mut cache: LruCache<String, String> = LruCache::new(CacheConfig {
        max_size: 10,
        max_entry_size: 6,
        size_calculation: Some(Arc::new(|value: &String, _: &String| value.len())),
        dispose: Some(Arc::new(move |_: &String, k: &String, r: DisposeReason| {
            sink.lock().unwrap().push((k.clone(), r))
        })),
        ..CacheConfig::default()
    })
    .unwrap();

    cache.set("a".to_string(), "xxxx".to_string()).unwrap();
    cache.set("b".to_string(), "yyyy".to_string()).unwrap();
    assert_eq!(cache.calculated_size(), 8);

    // Too big for a single entry, silently dropped
    cache.set("c".to_string(), "zzzzzzz".to_string()).unwrap();
    assert!(!cache.has("c"));
    assert_eq!(cache.calculated_size(), 8);

    cache.set("d".to_string(), "www".to_string()).unwrap();
    assert!(!cache.has("a"));
    assert_eq!(cache.calculated_size(), 7);

    assert_eq!(
        *reasons.lock().unwrap(),
        vec![("a".to_string(), DisposeReason::Evict)]
    );
    let stats = cache.stats();
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.rejections, 1);
}

// == Iteration Tests ==

#[test]
fn test_iteration_helpers() {
    let (clock, mut cache) = timed_cache(ttl_config(5, 0));
    for i in 0..4 {
        cache.set(i, i * 10).unwrap();
    }
    cache.set_with(9, 90, SetOptions::ttl(5)).unwrap();
    clock.advance(6);

    // Stale entries are skipped but left in place
    assert_eq!(pairs(&cache), vec![(3, 30), (2, 20), (1, 10), (0, 0)]);
    assert_eq!(
        cache.rvalues().copied().collect::<Vec<_>>(),
        vec![0, 10, 20, 30]
    );
    assert_eq!(cache.len(), 5);

    let mut visited = Vec::new();
    cache.rfor_each(|v, k| visited.push((*k, *v)));
    assert_eq!(visited, vec![(0, 0), (1, 10), (2, 20), (3, 30)]);

    assert_eq!(
        cache.find(|v, _| *v >= 10 && *v < 30, GetOptions::default()),
        Some(20)
    );
    assert_eq!(cache.keys().next(), Some(&2));
}
