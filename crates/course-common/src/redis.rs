/// Redis wrapper shared by the catalog, learner profiles and the recommendation cache.
///
/// Cache operations return `Option<T>`/`bool`: on any Redis error they log a warning
/// and degrade, so callers fall through to compute from source. Stores that must
/// surface failures take a connection through [`RedisCache::connection`] instead.
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::warn;

use crate::error::CommonError;

#[derive(Clone)]
pub struct RedisCache {
    client: Option<redis::Client>,
}

impl RedisCache {
    /// Attempt to create a client. If the URL is `None` or invalid, returns a
    /// `RedisCache` that always degrades gracefully (no-ops).
    pub fn new(url: Option<&str>) -> Self {
        let client = url.and_then(|u| {
            redis::Client::open(u)
                .inspect_err(|e| warn!(error = %e, url = u, "failed to create redis client, redis disabled"))
                .ok()
        });
        Self { client }
    }

    /// Whether a client was configured at all (says nothing about reachability).
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Test the connection by sending a PING. Returns `true` if Redis is reachable.
    pub async fn is_available(&self) -> bool {
        let Ok(mut conn) = self.connection().await else {
            return false;
        };
        let result: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
        result.is_ok()
    }

    /// Open a multiplexed connection, surfacing failures to the caller.
    pub async fn connection(&self) -> Result<MultiplexedConnection, CommonError> {
        let client = self.client.as_ref().ok_or(CommonError::RedisUnavailable)?;
        Ok(client.get_multiplexed_async_connection().await?)
    }

    async fn degraded_connection(&self) -> Option<MultiplexedConnection> {
        if self.client.is_none() {
            return None;
        }
        self.connection()
            .await
            .inspect_err(|e| warn!(error = %e, "redis connection failed"))
            .ok()
    }

    /// Get a value. Returns `None` if Redis is unavailable or the key doesn't exist.
    pub async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.degraded_connection().await?;
        conn.get::<_, Option<String>>(key)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis GET failed"))
            .ok()
            .flatten()
    }

    /// Set a value with a TTL in seconds. Returns `true` if successful.
    pub async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> bool {
        let Some(mut conn) = self.degraded_connection().await else {
            return false;
        };
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .inspect_err(|e| warn!(error = %e, key, "redis SETEX failed"))
            .is_ok()
    }

    /// Delete all keys matching a prefix using SCAN (not KEYS, which blocks).
    /// Returns the number of keys removed, or `None` if the sweep failed.
    pub async fn delete_by_prefix(&self, prefix: &str) -> Option<usize> {
        let mut conn = self.degraded_connection().await?;

        let pattern = format!("{prefix}*");
        let mut cursor: u64 = 0;
        let mut removed = 0;
        loop {
            let (next_cursor, keys): (u64, Vec<String>) = match redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
            {
                Ok(result) => result,
                Err(e) => {
                    warn!(error = %e, pattern, "redis SCAN failed");
                    return None;
                }
            };

            if !keys.is_empty() {
                if let Err(e) = conn.del::<_, ()>(&keys).await {
                    warn!(error = %e, "redis batch DEL failed during prefix delete");
                    return None;
                }
                removed += keys.len();
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }
        Some(removed)
    }
}
