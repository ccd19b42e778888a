use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::config::RedisConfig;
use crate::redis_client::RedisClient;

pub mod movies;
pub mod showtimes;

/// Read-through cache in front of the store.
///
/// Redis is optional: without a connection every lookup is a miss and every
/// write is a no-op. Cache failures are logged and never surface to callers.
#[derive(Clone)]
pub struct CacheService {
    redis: Option<RedisClient>,
    ttl_seconds: u64,
    showtime_ttl_seconds: u64,
}

// Writes ARGV[1] unless the entry already holds a newer `version` than ARGV[2]
const VERSIONED_SET: &str = r#"
    local current = redis.call('GET', KEYS[1])
    if current then
        local ok, cached = pcall(cjson.decode, current)
        if ok and type(cached) == 'table' then
            local cached_version = tonumber(cached['version'])
            if cached_version and cached_version > tonumber(ARGV[2]) then
                return 0
            end
        end
    end
    redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[3])
    return 1
"#;

// Writes ARGV[1] only while the counter at KEYS[2] still equals ARGV[2]
const GENERATION_SET: &str = r#"
    local generation = tonumber(redis.call('GET', KEYS[2]) or '0')
    if generation ~= tonumber(ARGV[2]) then
        return 0
    end
    redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[3])
    return 1
"#;

impl CacheService {
    pub fn new(redis: RedisClient, config: &RedisConfig) -> Self {
        Self {
            redis: Some(redis),
            ttl_seconds: config.ttl_seconds,
            showtime_ttl_seconds: config.showtime_ttl_seconds,
        }
    }

    pub fn disabled() -> Self {
        info!("Redis not configured, caching disabled");
        Self {
            redis: None,
            ttl_seconds: 0,
            showtime_ttl_seconds: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.redis.is_some()
    }

    // === Redis primitives ===

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.redis.as_ref()?.conn.clone();
        let data: Option<String> = match conn.get(key).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Cache read failed for {}: {:?}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&data?) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Dropping unreadable cache entry {}: {:?}", key, e);
                self.delete(key).await;
                None
            }
        }
    }

    /// Current value of a generation counter; a missing counter reads as 0.
    /// `None` when caching is off or Redis is unreachable.
    async fn generation(&self, counter: &str) -> Option<i64> {
        let mut conn = self.redis.as_ref()?.conn.clone();
        let result: Result<Option<i64>, redis::RedisError> = conn.get(counter).await;
        match result {
            Ok(generation) => Some(generation.unwrap_or(0)),
            Err(e) => {
                warn!("Cache read failed for {}: {:?}", counter, e);
                None
            }
        }
    }

    async fn bump_generation(&self, counter: &str) {
        let Some(redis) = &self.redis else { return };
        let mut conn = redis.conn.clone();
        let result: Result<i64, redis::RedisError> = conn.incr(counter, 1).await;
        if let Err(e) = result {
            warn!("Cache generation bump failed for {}: {:?}", counter, e);
        }
    }

    /// Writes `value` only if `counter` still holds `generation`, i.e. nothing
    /// was invalidated since the caller read the generation.
    async fn set_json_at_generation<T: Serialize>(
        &self,
        key: &str,
        counter: &str,
        value: &T,
        generation: i64,
    ) -> bool {
        let Some(redis) = &self.redis else { return false };
        let data = match serde_json::to_string(value) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to serialize cache entry {}: {:?}", key, e);
                return false;
            }
        };

        let mut conn = redis.conn.clone();
        let result: Result<i64, redis::RedisError> = redis::Script::new(GENERATION_SET)
            .key(key)
            .key(counter)
            .arg(data)
            .arg(generation)
            .arg(self.ttl_seconds)
            .invoke_async(&mut conn)
            .await;
        match result {
            Ok(1) => true,
            Ok(_) => {
                debug!("Skipped caching {} from generation {}", key, generation);
                false
            }
            Err(e) => {
                warn!("Cache write failed for {}: {:?}", key, e);
                false
            }
        }
    }

    /// Writes `value` unless the entry already carries a higher version.
    /// Returns whether the value was written.
    async fn set_json_versioned<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        version: i64,
        ttl_seconds: u64,
    ) -> bool {
        let Some(redis) = &self.redis else { return false };
        let data = match serde_json::to_string(value) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to serialize cache entry {}: {:?}", key, e);
                return false;
            }
        };

        let mut conn = redis.conn.clone();
        let result: Result<i64, redis::RedisError> = redis::Script::new(VERSIONED_SET)
            .key(key)
            .arg(data)
            .arg(version)
            .arg(ttl_seconds)
            .invoke_async(&mut conn)
            .await;
        match result {
            Ok(1) => true,
            Ok(_) => {
                debug!("Kept newer cache entry {} over version {}", key, version);
                false
            }
            Err(e) => {
                warn!("Cache write failed for {}: {:?}", key, e);
                false
            }
        }
    }

    async fn delete(&self, key: &str) {
        let Some(redis) = &self.redis else { return };
        let mut conn = redis.conn.clone();
        let result: Result<(), redis::RedisError> = conn.del(key).await;
        match result {
            Ok(()) => debug!("Invalidated cache key {}", key),
            Err(e) => warn!("Cache invalidation failed for {}: {:?}", key, e),
        }
    }
}
