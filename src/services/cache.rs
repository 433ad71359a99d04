use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Source of the current time for cache expiry.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(start_millis),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// A thread-safe cache with TTL support and single-flight refill.
pub struct Cache<V> {
    data: DashMap<String, CacheEntry<V>>,
    /// One refill lock per key.
    locks: DashMap<String, Arc<Mutex<()>>>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

struct CacheEntry<V> {
    value: V,
    fetched_at: i64,
    expires_at: i64,
}

impl<V: Clone> Cache<V> {
    /// Create a new cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    /// Create a cache that reads time from `clock`.
    pub fn with_clock(default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            data: DashMap::new(),
            locks: DashMap::new(),
            default_ttl,
            clock,
        }
    }

    /// Get a value from the cache.
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.data.get(key)?;
        if entry.expires_at > self.clock.now_millis() {
            Some(entry.value.clone())
        } else {
            drop(entry);
            self.data.remove(key);
            None
        }
    }

    /// When the live value for `key` was stored, in epoch milliseconds.
    pub fn fetched_at(&self, key: &str) -> Option<i64> {
        let entry = self.data.get(key)?;
        (entry.expires_at > self.clock.now_millis()).then_some(entry.fetched_at)
    }

    /// Set a value in the cache with the default TTL.
    pub fn set(&self, key: String, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Set a value in the cache with a custom TTL.
    pub fn set_with_ttl(&self, key: String, value: V, ttl: Duration) {
        let now = self.clock.now_millis();
        self.data.insert(
            key,
            CacheEntry {
                value,
                fetched_at: now,
                expires_at: now.saturating_add(ttl.as_millis() as i64),
            },
        );
    }

    /// Remove a value from the cache.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.data.remove(key).map(|(_, entry)| entry.value)
    }

    /// Clear all entries from the cache.
    pub fn clear(&self) {
        self.data.clear();
    }

    /// Get the number of entries in the cache (including expired).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return the live value for `key`, fetching it on a miss.
    ///
    /// Concurrent misses on the same key wait on one refill lock; whoever
    /// gets it second finds the fresh value and does not fetch again. A
    /// failed fetch caches nothing.
    pub async fn get_or_refresh<F, Fut, E>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let lock = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        if let Some(value) = self.get(key) {
            debug!("Cache refill for {} satisfied by concurrent fetch", key);
            return Ok(value);
        }

        debug!("Cache miss for {}, fetching", key);
        let value = fetch().await?;
        self.set(key.to_string(), value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn manual_cache(ttl: Duration) -> (Cache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        (Cache::with_clock(ttl, clock.clone()), clock)
    }

    #[test]
    fn test_cache_basic() {
        let cache = Cache::new(Duration::from_secs(60));
        cache.set("key1".to_string(), "value1".to_string());
        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        assert_eq!(cache.get("key2"), None);
    }

    #[test]
    fn test_cache_expiration_under_manual_clock() {
        let (cache, clock) = manual_cache(Duration::from_secs(300));
        cache.set("btc".to_string(), "series".to_string());

        clock.advance(Duration::from_secs(299));
        assert_eq!(cache.get("btc"), Some("series".to_string()));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("btc"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_custom_ttl() {
        let (cache, clock) = manual_cache(Duration::from_secs(60));
        cache.set_with_ttl("short".to_string(), "value".to_string(), Duration::from_millis(10));
        cache.set_with_ttl("long".to_string(), "value".to_string(), Duration::from_secs(60));

        clock.advance(Duration::from_millis(20));

        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.get("long"), Some("value".to_string()));
    }

    #[test]
    fn test_cache_fetched_at() {
        let (cache, clock) = manual_cache(Duration::from_secs(60));
        cache.set("key".to_string(), "value".to_string());
        assert_eq!(cache.fetched_at("key"), Some(1_700_000_000_000));

        clock.advance(Duration::from_secs(61));
        assert_eq!(cache.fetched_at("key"), None);
    }

    #[test]
    fn test_cache_remove_and_clear() {
        let cache = Cache::new(Duration::from_secs(60));
        cache.set("key1".to_string(), "value1".to_string());
        cache.set("key2".to_string(), "value2".to_string());

        assert_eq!(cache.remove("key1"), Some("value1".to_string()));
        assert_eq!(cache.remove("nonexistent"), None);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_fetch_once() {
        let cache: Arc<Cache<String>> = Arc::new(Cache::new(Duration::from_secs(60)));
        let fetches = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let fetches = fetches.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_refresh("btc", || async move {
                            fetches.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            Ok::<_, String>("series".to_string())
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap(), Ok("series".to_string()));
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_caches_nothing() {
        let (cache, _clock) = manual_cache(Duration::from_secs(60));

        let result = cache
            .get_or_refresh("btc", || async { Err::<String, _>("offline".to_string()) })
            .await;
        assert_eq!(result, Err("offline".to_string()));
        assert!(cache.get("btc").is_none());

        let result = cache
            .get_or_refresh("btc", || async { Ok::<_, String>("series".to_string()) })
            .await;
        assert_eq!(result, Ok("series".to_string()));
    }

    #[tokio::test]
    async fn test_refresh_after_expiry() {
        let (cache, clock) = manual_cache(Duration::from_secs(10));
        let fetches = AtomicUsize::new(0);

        for _ in 0..3 {
            cache
                .get_or_refresh("btc", || async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>("series".to_string())
                })
                .await
                .unwrap();
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(10));
        cache
            .get_or_refresh("btc", || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>("series".to_string())
            })
            .await
            .unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }
}
