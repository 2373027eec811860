/// Learner profile stores: the completed course codes recorded per learner.
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::RwLock;

use course_common::catalog::KEY_PREFIX;
use course_common::error::CommonError;
use course_common::redis::RedisCache;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Completed course codes for a learner; empty for unknown learners.
    async fn completed_courses(&self, learner_id: &str) -> Result<Vec<String>, CommonError>;

    /// Replace the learner's completed course codes.
    async fn save_completed_courses(&self, learner_id: &str, codes: &[String]) -> Result<(), CommonError>;
}

/// Trim codes, drop blanks and repeats, keep first-seen order.
pub fn normalize_codes(codes: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    codes
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

/// Profiles stored as JSON arrays under `crs:v1:learner:{id}:completed`.
pub struct RedisProfiles {
    redis: RedisCache,
}

impl RedisProfiles {
    pub fn new(redis: RedisCache) -> Self {
        Self { redis }
    }
}

fn completed_key(learner_id: &str) -> String {
    format!("{KEY_PREFIX}learner:{learner_id}:completed")
}

#[async_trait]
impl ProfileStore for RedisProfiles {
    async fn completed_courses(&self, learner_id: &str) -> Result<Vec<String>, CommonError> {
        let mut conn = self.redis.connection().await?;
        let raw: Option<String> = conn.get(completed_key(learner_id)).await?;
        match raw {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save_completed_courses(&self, learner_id: &str, codes: &[String]) -> Result<(), CommonError> {
        let json = serde_json::to_string(codes)?;
        let mut conn = self.redis.connection().await?;
        let _: () = conn.set(completed_key(learner_id), json).await?;
        Ok(())
    }
}

/// Process-local profiles, used when Redis is not configured.
#[derive(Default)]
pub struct MemoryProfiles {
    learners: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryProfiles {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfiles {
    async fn completed_courses(&self, learner_id: &str) -> Result<Vec<String>, CommonError> {
        let learners = self.learners.read().await;
        Ok(learners.get(learner_id).cloned().unwrap_or_default())
    }

    async fn save_completed_courses(&self, learner_id: &str, codes: &[String]) -> Result<(), CommonError> {
        let mut learners = self.learners.write().await;
        learners.insert(learner_id.to_string(), codes.to_vec());
        Ok(())
    }
}
