/// Recommendation pipeline: validate, resolve the completed set, build the
/// candidate pool, score, tier.
///
/// Every intermediate value is local to one call; the only shared pieces are
/// the read-only catalog handle and the result cache.
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use course_common::api::{RecommendationMeta, RecommendationResponse, RecommendedCourse};
use course_common::catalog::CatalogStore;

use crate::cache::RecommendationCache;
use crate::error::{bounded, AppError};
use crate::pool::build_pool;
use crate::scoring::{score_pool, ScoredCandidate};
use crate::tiering::partition;

pub struct RecommendationService {
    catalog: Arc<dyn CatalogStore>,
    cache: RecommendationCache,
    store_timeout: Duration,
}

impl RecommendationService {
    pub fn new(catalog: Arc<dyn CatalogStore>, cache: RecommendationCache, store_timeout: Duration) -> Self {
        Self {
            catalog,
            cache,
            store_timeout,
        }
    }

    /// Recommend courses for a completed set.
    ///
    /// Rejects a missing or empty list before touching the catalog, and a list
    /// that resolves to no catalog records.
    pub async fn recommend(
        &self,
        completed_codes: Option<Vec<String>>,
    ) -> Result<RecommendationResponse, AppError> {
        let codes: Vec<String> = match completed_codes {
            Some(codes) if !codes.is_empty() => codes.into_iter().map(|c| c.trim().to_string()).collect(),
            _ => return Err(AppError::InvalidInput),
        };

        if let Some(cached) = self.cache.get(&codes).await {
            info!(completed = codes.len(), "recommendation cache hit");
            return Ok(cached);
        }

        let completed = bounded(
            "completed course lookup",
            self.store_timeout,
            self.catalog.find_by_codes(&codes),
        )
        .await?;
        if completed.is_empty() {
            info!(requested = codes.len(), "no completed courses matched the catalog");
            return Err(AppError::NoMatchingCourses);
        }

        let catalog = bounded(
            "candidate lookup",
            self.store_timeout,
            self.catalog.find_all_excluding(&codes),
        )
        .await?;

        let pool = build_pool(catalog, &completed, &codes);
        let candidates_considered = pool.len();
        let tiering = partition(score_pool(pool, &completed));

        if tiering.is_empty() {
            info!(
                candidates = candidates_considered,
                "no candidate reached the weak threshold"
            );
        }
        info!(
            completed = completed.len(),
            candidates = candidates_considered,
            recommended = tiering.len(),
            strong = tiering.strong.len(),
            moderate = tiering.moderate.len(),
            weak = tiering.weak.len(),
            "recommendations generated"
        );

        let response = RecommendationResponse {
            strong: to_api(tiering.strong),
            moderate: to_api(tiering.moderate),
            weak: to_api(tiering.weak),
            meta: RecommendationMeta {
                candidates_considered,
            },
        };
        self.cache.set(&codes, &response).await;
        Ok(response)
    }
}

fn to_api(tier: Vec<ScoredCandidate>) -> Vec<RecommendedCourse> {
    tier.into_iter()
        .map(|ScoredCandidate { course, score }| RecommendedCourse {
            code: course.code,
            name: course.name,
            faculty: course.faculty,
            school: course.school,
            campus: course.campus,
            career: course.career,
            score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use course_common::catalog::MemoryCatalog;
    use course_common::error::CommonError;
    use course_common::model::CourseRecord;
    use course_common::redis::RedisCache;

    fn course(code: &str, name: &str, school: &str, faculty: &str, career: &str) -> CourseRecord {
        let mut record = CourseRecord::new(code, name);
        record.school = Some(school.to_string());
        record.faculty = Some(faculty.to_string());
        record.career = Some(career.to_string());
        record.campus = Some("Sydney".to_string());
        record
    }

    fn sample_catalog() -> Vec<CourseRecord> {
        vec![
            course("COMP1511", "Programming Fundamentals", "CSE", "Engineering", "UGRD"),
            course("COMP2521", "Programming Fundamentals II", "CSE", "Engineering", "UGRD"),
            course("COMP1911", "programming fundamentals", "CSE", "Engineering", "UGRD"),
            course("ELEC1111", "Electrical Circuits", "EET", "Engineering", "UGRD"),
            course("MATH1131", "Mathematics 1A", "Mathematics", "Science", "UGRD"),
            course("COMP9021", "Principles of Programming", "CSE", "Engineering", "PGRD"),
            course("HIST1001", "Medieval Europe", "Humanities", "Arts", "PGRD"),
        ]
    }

    fn service_over(catalog: Arc<dyn CatalogStore>) -> RecommendationService {
        RecommendationService::new(
            catalog,
            RecommendationCache::new(RedisCache::new(None), 3600),
            Duration::from_secs(1),
        )
    }

    fn service() -> RecommendationService {
        service_over(Arc::new(MemoryCatalog::new(sample_catalog())))
    }

    fn codes(values: &[&str]) -> Option<Vec<String>> {
        Some(values.iter().map(|s| s.to_string()).collect())
    }

    fn tier_codes(tier: &[RecommendedCourse]) -> Vec<&str> {
        tier.iter().map(|c| c.code.as_str()).collect()
    }

    /// Catalog that counts lookups, to prove validation happens first.
    struct CountingCatalog {
        inner: MemoryCatalog,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CatalogStore for CountingCatalog {
        async fn find_by_codes(&self, codes: &[String]) -> Result<Vec<CourseRecord>, CommonError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_codes(codes).await
        }

        async fn find_all_excluding(&self, codes: &[String]) -> Result<Vec<CourseRecord>, CommonError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_all_excluding(codes).await
        }
    }

    struct BrokenCatalog;

    #[async_trait]
    impl CatalogStore for BrokenCatalog {
        async fn find_by_codes(&self, _codes: &[String]) -> Result<Vec<CourseRecord>, CommonError> {
            Err(CommonError::RedisUnavailable)
        }

        async fn find_all_excluding(&self, _codes: &[String]) -> Result<Vec<CourseRecord>, CommonError> {
            Err(CommonError::RedisUnavailable)
        }
    }

    #[tokio::test]
    async fn test_follow_on_course_is_strong() {
        let response = service().recommend(codes(&["COMP1511"])).await.unwrap();

        assert_eq!(response.strong[0].code, "COMP2521");
        assert!(response.strong[0].score >= 0.85);
        assert_eq!(response.strong[0].campus.as_deref(), Some("Sydney"));
    }

    #[tokio::test]
    async fn test_tiers_for_sample_catalog() {
        let response = service().recommend(codes(&["COMP1511"])).await.unwrap();

        // COMP1911 shares the completed course's name and is excluded from the pool.
        assert_eq!(response.meta.candidates_considered, 5);
        // COMP2521: 0.9333; COMP9021: 0.40 + 0.25 + 0.20 * 1/4 = 0.70
        assert_eq!(tier_codes(&response.strong), vec!["COMP2521", "COMP9021"]);
        // ELEC1111: faculty + career = 0.40
        assert_eq!(tier_codes(&response.moderate), vec!["ELEC1111"]);
        // MATH1131: career only = 0.15, HIST1001: nothing
        assert!(response.weak.is_empty());
        assert_eq!(response.moderate[0].score, 0.4);
    }

    #[tokio::test]
    async fn test_completed_codes_never_returned() {
        let response = service()
            .recommend(codes(&["COMP1511", "MATH1131"]))
            .await
            .unwrap();
        for course in response.strong.iter().chain(&response.moderate).chain(&response.weak) {
            assert_ne!(course.code, "COMP1511");
            assert_ne!(course.code, "MATH1131");
            assert!(course.score >= 0.2);
        }
    }

    #[tokio::test]
    async fn test_empty_input_rejected_without_lookup() {
        let catalog = Arc::new(CountingCatalog {
            inner: MemoryCatalog::new(sample_catalog()),
            calls: AtomicUsize::new(0),
        });
        let service = service_over(catalog.clone());

        assert!(matches!(service.recommend(Some(Vec::new())).await, Err(AppError::InvalidInput)));
        assert!(matches!(service.recommend(None).await, Err(AppError::InvalidInput)));
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_codes_rejected() {
        let result = service().recommend(codes(&["NOPE1000", "NOPE2000"])).await;
        assert!(matches!(result, Err(AppError::NoMatchingCourses)));
    }

    #[tokio::test]
    async fn test_codes_are_trimmed() {
        let response = service().recommend(codes(&[" COMP1511 "])).await.unwrap();
        assert_eq!(response.strong[0].code, "COMP2521");
    }

    #[tokio::test]
    async fn test_store_failure_is_upstream_error() {
        let result = service_over(Arc::new(BrokenCatalog))
            .recommend(codes(&["COMP1511"]))
            .await;
        assert!(matches!(result, Err(AppError::UpstreamUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_unrelated_catalog_yields_empty_tiers() {
        let catalog = vec![
            course("COMP1511", "Programming Fundamentals", "CSE", "Engineering", "UGRD"),
            course("HIST1001", "Medieval Europe", "Humanities", "Arts", "PGRD"),
        ];
        let response = service_over(Arc::new(MemoryCatalog::new(catalog)))
            .recommend(codes(&["COMP1511"]))
            .await
            .unwrap();
        assert!(response.strong.is_empty() && response.moderate.is_empty() && response.weak.is_empty());
        assert_eq!(response.meta.candidates_considered, 1);
    }

    #[tokio::test]
    async fn test_unnamed_completed_course_hides_unnamed_candidates() {
        let catalog = vec![
            course("COMP1511", "", "CSE", "", ""),
            course("COMP9999", "", "CSE", "", ""),
        ];
        let response = service_over(Arc::new(MemoryCatalog::new(catalog)))
            .recommend(codes(&["COMP1511"]))
            .await
            .unwrap();
        assert_eq!(response.meta.candidates_considered, 0);
        assert!(response.strong.is_empty() && response.moderate.is_empty() && response.weak.is_empty());
    }
}
