/// Redis caching layer for recommendation results.
///
/// All operations degrade gracefully: if Redis is unavailable the request is
/// computed from the catalog. Only successful responses are cached.
///
/// Key schema: `crs:v1:recs:{sha256(sorted unique codes)}`: JSON
/// RecommendationResponse (TTL from config). The catalog loader clears the
/// whole prefix after an ingest.
use sha2::{Digest, Sha256};
use tracing::warn;

use course_common::api::RecommendationResponse;
use course_common::catalog::RECOMMENDATIONS_PREFIX;
use course_common::redis::RedisCache;

pub struct RecommendationCache {
    redis: RedisCache,
    ttl_secs: u64,
}

impl RecommendationCache {
    pub fn new(redis: RedisCache, ttl_secs: u64) -> Self {
        Self { redis, ttl_secs }
    }

    fn enabled(&self) -> bool {
        self.ttl_secs > 0 && self.redis.is_configured()
    }

    pub async fn get(&self, codes: &[String]) -> Option<RecommendationResponse> {
        if !self.enabled() {
            return None;
        }
        let key = recommendation_key(codes);
        let json = self.redis.get(&key).await?;
        serde_json::from_str(&json)
            .inspect_err(|e| warn!(error = %e, key, "cache deserialization failed"))
            .ok()
    }

    pub async fn set(&self, codes: &[String], response: &RecommendationResponse) {
        if !self.enabled() {
            return;
        }
        let key = recommendation_key(codes);
        if let Ok(json) = serde_json::to_string(response) {
            self.redis.set_with_ttl(&key, &json, self.ttl_secs).await;
        }
    }
}

/// Deterministic cache key: the same set of codes in any order maps to one key.
fn recommendation_key(codes: &[String]) -> String {
    let mut sorted: Vec<&str> = codes.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut hasher = Sha256::new();
    for code in sorted {
        hasher.update(code.as_bytes());
        hasher.update(b"|");
    }
    format!("{RECOMMENDATIONS_PREFIX}{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_key_ignores_order_and_repeats() {
        let a = recommendation_key(&codes(&["COMP1511", "MATH1131"]));
        let b = recommendation_key(&codes(&["MATH1131", "COMP1511", "COMP1511"]));
        assert_eq!(a, b);
        assert!(a.starts_with("crs:v1:recs:"));
    }

    #[test]
    fn test_key_separates_code_boundaries() {
        let a = recommendation_key(&codes(&["AB", "C"]));
        let b = recommendation_key(&codes(&["A", "BC"]));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_disabled_without_redis() {
        let cache = RecommendationCache::new(RedisCache::new(None), 3600);
        assert!(cache.get(&codes(&["COMP1511"])).await.is_none());
    }
}
