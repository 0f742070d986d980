//! Tests for [`ApiCache`] TTL and insertion-order eviction, and for
//! [`generate_key`].

use std::time::Duration;

use larder::cache::{ApiCache, CacheConfig, generate_key};
use serde_json::json;

fn cache(max_entries: usize, ttl_ms: u64) -> ApiCache<String> {
    ApiCache::new(
        &CacheConfig::new()
            .max_entries(max_entries)
            .ttl(Duration::from_millis(ttl_ms)),
    )
}

#[tokio::test(start_paused = true)]
async fn value_readable_until_ttl_passes() {
    let cache = cache(10, 1_000);
    cache.set("recipes:eggs", "frittata".to_string());
    assert_eq!(cache.get("recipes:eggs").as_deref(), Some("frittata"));

    tokio::time::advance(Duration::from_millis(1_000)).await;
    assert_eq!(cache.get("recipes:eggs").as_deref(), Some("frittata"));

    tokio::time::advance(Duration::from_millis(1)).await;
    assert_eq!(cache.get("recipes:eggs"), None);
    // Expired entries are removed on read
    assert!(cache.is_empty());
}

#[tokio::test(start_paused = true)]
async fn explicit_ttl_overrides_default() {
    let cache = cache(10, 60_000);
    cache.set_with_ttl("short", "a".to_string(), Duration::from_millis(10));
    cache.set("long", "b".to_string());

    tokio::time::advance(Duration::from_millis(11)).await;
    assert_eq!(cache.get("short"), None);
    assert_eq!(cache.get("long").as_deref(), Some("b"));
}

#[tokio::test(start_paused = true)]
async fn overwrite_refreshes_expiry() {
    let cache = cache(10, 100);
    cache.set("k", "old".to_string());
    tokio::time::advance(Duration::from_millis(80)).await;
    cache.set("k", "new".to_string());
    tokio::time::advance(Duration::from_millis(80)).await;
    assert_eq!(cache.get("k").as_deref(), Some("new"));
}

#[test]
fn inserting_past_capacity_evicts_first_inserted() {
    let max = 5;
    let cache = cache(max, 60_000);
    for i in 0..=max {
        cache.set(format!("key-{i}"), format!("value-{i}"));
    }

    assert_eq!(cache.len(), max);
    assert!(cache.get("key-0").is_none());
    for i in 1..=max {
        assert_eq!(cache.get(&format!("key-{i}")), Some(format!("value-{i}")));
    }
}

#[test]
fn overwriting_does_not_evict() {
    let cache = cache(2, 60_000);
    cache.set("a", "1".to_string());
    cache.set("b", "2".to_string());
    cache.set("a", "3".to_string());

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("a").as_deref(), Some("3"));
    assert_eq!(cache.get("b").as_deref(), Some("2"));

    // "a" keeps its original position, so it goes first
    cache.set("c", "4".to_string());
    assert!(cache.get("a").is_none());
    assert!(cache.get("b").is_some());
}

#[test]
fn delete_and_clear() {
    let cache = cache(10, 60_000);
    cache.set("a", "1".to_string());
    cache.set("b", "2".to_string());

    cache.delete("a");
    assert!(!cache.contains_key("a"));
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn zero_capacity_stores_nothing() {
    let cache = cache(0, 60_000);
    cache.set("a", "1".to_string());
    assert!(cache.is_empty());
    assert_eq!(cache.get("a"), None);
}

#[test]
fn defaults() {
    let cache: ApiCache<String> = ApiCache::default();
    assert_eq!(cache.max_size(), 100);
    assert_eq!(cache.ttl(), Duration::from_secs(3600));
}

#[test]
fn thread_safety() {
    use std::sync::Arc;
    use std::thread;

    let cache = Arc::new(cache(1_000, 60_000));
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..100 {
                    cache.set(format!("{t}-{i}"), format!("{i}"));
                    let _ = cache.get(&format!("{t}-{i}"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(cache.len(), 400);
}

// ============================================================================
// Key generation
// ============================================================================

#[test]
fn permutations_produce_same_key() {
    let a = generate_key(
        "find",
        [
            ("ingredients", json!(["egg", "rice"])),
            ("number", json!(10)),
            ("ranking", json!(1)),
        ],
    );
    let b = generate_key(
        "find",
        [
            ("ranking", json!(1)),
            ("ingredients", json!(["egg", "rice"])),
            ("number", json!(10)),
        ],
    );
    assert_eq!(a, b);
}

#[test]
fn nested_objects_are_order_independent() {
    let a = generate_key("plan", [("profile", json!({"age": 30, "goal": "lose"}))]);
    let b = generate_key("plan", [("profile", json!({"goal": "lose", "age": 30}))]);
    assert_eq!(a, b);
}

#[test]
fn different_values_or_prefixes_differ() {
    let base = generate_key("find", [("number", json!(10))]);
    assert_ne!(base, generate_key("find", [("number", json!(11))]));
    assert_ne!(base, generate_key("plan", [("number", json!(10))]));
}
