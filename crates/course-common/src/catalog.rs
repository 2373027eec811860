/// Course catalog stores.
///
/// The catalog is read-only from the recommender's point of view; only the
/// loader writes to it. Both stores return records in catalog order, which is
/// the order tie-breaks fall back to when scoring.
///
/// Redis key schema (shared with the recommendation cache):
/// - `crs:v1:catalog`: hash, field = course code, value = JSON CourseRecord
/// - `crs:v1:recs:{sha256(codes)}`: JSON recommendation response (TTL)
/// - `crs:v1:learner:{id}:completed`: JSON array of completed course codes
use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::CommonError;
use crate::model::CourseRecord;
use crate::redis::RedisCache;

pub const KEY_PREFIX: &str = "crs:v1:";
pub const CATALOG_KEY: &str = "crs:v1:catalog";
pub const RECOMMENDATIONS_PREFIX: &str = "crs:v1:recs:";

const UPSERT_BATCH: usize = 500;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Records whose code is one of `codes`, in catalog order. Unknown codes are skipped.
    async fn find_by_codes(&self, codes: &[String]) -> Result<Vec<CourseRecord>, CommonError>;

    /// Every record whose code is not one of `codes`, in catalog order.
    async fn find_all_excluding(&self, codes: &[String]) -> Result<Vec<CourseRecord>, CommonError>;

    /// The whole catalog, in catalog order.
    async fn all(&self) -> Result<Vec<CourseRecord>, CommonError> {
        self.find_all_excluding(&[]).await
    }
}

// --- In-memory catalog ---

/// Catalog held in memory, in the order it was loaded.
pub struct MemoryCatalog {
    courses: Vec<CourseRecord>,
}

impl MemoryCatalog {
    /// Build from records, keeping the first record for any repeated code.
    pub fn new(courses: Vec<CourseRecord>) -> Self {
        let mut seen = HashSet::new();
        let courses = courses
            .into_iter()
            .filter(|c| seen.insert(c.code.clone()))
            .collect();
        Self { courses }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, CommonError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CommonError::CatalogFile(format!("failed to read {}: {e}", path.display()))
        })?;
        let courses = parse_catalog_json(&content)?;
        info!(path = %path.display(), courses = courses.len(), "catalog file loaded");
        Ok(Self::new(courses))
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn find_by_codes(&self, codes: &[String]) -> Result<Vec<CourseRecord>, CommonError> {
        let wanted: HashSet<&str> = codes.iter().map(String::as_str).collect();
        Ok(self
            .courses
            .iter()
            .filter(|c| wanted.contains(c.code.as_str()))
            .cloned()
            .collect())
    }

    async fn find_all_excluding(&self, codes: &[String]) -> Result<Vec<CourseRecord>, CommonError> {
        let excluded: HashSet<&str> = codes.iter().map(String::as_str).collect();
        Ok(self
            .courses
            .iter()
            .filter(|c| !excluded.contains(c.code.as_str()))
            .cloned()
            .collect())
    }
}

/// Parse a catalog document: either a bare JSON array of courses, or an object
/// with a `courses` array (the shape of the upstream GraphQL `data` payload).
pub fn parse_catalog_json(content: &str) -> Result<Vec<CourseRecord>, CommonError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CatalogDocument {
        Bare(Vec<CourseRecord>),
        Wrapped { courses: Vec<CourseRecord> },
    }

    let courses = match serde_json::from_str::<CatalogDocument>(content) {
        Ok(CatalogDocument::Bare(courses)) | Ok(CatalogDocument::Wrapped { courses }) => courses,
        Err(e) => {
            return Err(CommonError::CatalogFile(format!(
                "expected a JSON array of courses or {{\"courses\": [...]}}: {e}"
            )))
        }
    };

    Ok(courses
        .into_iter()
        .filter(|c| {
            let keep = !c.code.trim().is_empty();
            if !keep {
                warn!(name = %c.name, "skipping catalog record without a course code");
            }
            keep
        })
        .collect())
}

// --- Redis catalog ---

/// Catalog stored in a single Redis hash. Catalog order is course-code order,
/// since hash fields carry no insertion order.
pub struct RedisCatalog {
    redis: RedisCache,
}

impl RedisCatalog {
    pub fn new(redis: RedisCache) -> Self {
        Self { redis }
    }

    /// Insert or replace records by code. Returns the number written.
    pub async fn upsert(&self, courses: &[CourseRecord]) -> Result<usize, CommonError> {
        let mut conn = self.redis.connection().await?;
        let mut written = 0;
        for batch in courses.chunks(UPSERT_BATCH) {
            let mut pipe = redis::pipe();
            for course in batch {
                let json = serde_json::to_string(course)?;
                pipe.hset(CATALOG_KEY, &course.code, json).ignore();
            }
            let _: () = pipe.query_async(&mut conn).await?;
            written += batch.len();
        }
        Ok(written)
    }

    /// Number of courses currently stored.
    pub async fn count(&self) -> Result<usize, CommonError> {
        let mut conn = self.redis.connection().await?;
        let count: usize = redis::cmd("HLEN")
            .arg(CATALOG_KEY)
            .query_async(&mut conn)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl CatalogStore for RedisCatalog {
    async fn find_by_codes(&self, codes: &[String]) -> Result<Vec<CourseRecord>, CommonError> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.redis.connection().await?;
        let values: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(CATALOG_KEY)
            .arg(codes)
            .query_async(&mut conn)
            .await?;

        let mut seen = HashSet::new();
        let mut courses: Vec<CourseRecord> = values
            .into_iter()
            .flatten()
            .filter_map(|json| decode_record(&json))
            .filter(|c| seen.insert(c.code.clone()))
            .collect();
        courses.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(courses)
    }

    async fn find_all_excluding(&self, codes: &[String]) -> Result<Vec<CourseRecord>, CommonError> {
        let mut conn = self.redis.connection().await?;
        let entries: HashMap<String, String> = redis::cmd("HGETALL")
            .arg(CATALOG_KEY)
            .query_async(&mut conn)
            .await?;

        let excluded: HashSet<&str> = codes.iter().map(String::as_str).collect();
        let mut courses: Vec<CourseRecord> = entries
            .into_iter()
            .filter(|(code, _)| !excluded.contains(code.as_str()))
            .filter_map(|(_, json)| decode_record(&json))
            .collect();
        courses.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(courses)
    }
}

fn decode_record(json: &str) -> Option<CourseRecord> {
    serde_json::from_str(json)
        .inspect_err(|e| warn!(error = %e, "catalog record deserialization failed, skipping"))
        .ok()
}
