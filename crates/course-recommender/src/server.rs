use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use course_common::api::{
    CompletedCoursesResponse, CourseOption, CourseSearchParams, HealthResponse,
    RecommendationRequest, RecommendationResponse, SaveCompletedCoursesRequest,
};
use course_common::catalog::CatalogStore;
use course_common::redis::RedisCache;

use crate::error::{bounded, ApiError, AppError};
use crate::profile::{normalize_codes, ProfileStore};
use crate::recommend::RecommendationService;
use crate::search::search_courses;

const RECOMMEND_FAILED: &str = "Recommendation generation failed";
const SEARCH_FAILED: &str = "Search failed";
const SAVE_FAILED: &str = "Could not save courses";
const LOAD_FAILED: &str = "Could not load courses";

#[derive(Clone)]
pub struct AppState {
    recommender: Arc<RecommendationService>,
    catalog: Arc<dyn CatalogStore>,
    profiles: Arc<dyn ProfileStore>,
    redis: RedisCache,
    store_timeout: Duration,
}

impl AppState {
    pub fn new(
        recommender: Arc<RecommendationService>,
        catalog: Arc<dyn CatalogStore>,
        profiles: Arc<dyn ProfileStore>,
        redis: RedisCache,
        store_timeout: Duration,
    ) -> Self {
        Self {
            recommender,
            catalog,
            profiles,
            redis,
            store_timeout,
        }
    }
}

/// CORS for the browser client: one configured origin, or any origin.
pub fn cors_layer(allow_origin: Option<&str>) -> Result<CorsLayer, AppError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    match allow_origin {
        Some(origin) => {
            let origin = HeaderValue::from_str(origin)
                .map_err(|e| AppError::Config(format!("invalid CORS_ALLOW_ORIGIN '{origin}': {e}")))?;
            Ok(layer.allow_origin(origin))
        }
        None => Ok(layer.allow_origin(Any)),
    }
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/api/recommendations", post(recommend_handler))
        .route("/api/courses/search", get(search_handler))
        .route(
            "/api/learners/{id}/completed-courses",
            post(save_completed_handler).get(completed_handler),
        )
        .route("/api/learners/{id}/recommendations", get(learner_recommend_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn recommend_handler(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    // A body that is not JSON, or whose list is not an array of strings,
    // is the same client error as an empty list.
    let Json(request) = payload.map_err(|_| AppError::InvalidInput.into_api(RECOMMEND_FAILED))?;
    state
        .recommender
        .recommend(request.completed_courses)
        .await
        .map(Json)
        .map_err(|e| e.into_api(RECOMMEND_FAILED))
}

async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<CourseSearchParams>,
) -> Result<Json<Vec<CourseOption>>, ApiError> {
    let courses = bounded("course search", state.store_timeout, state.catalog.all())
        .await
        .map_err(|e| e.into_api(SEARCH_FAILED))?;
    Ok(Json(search_courses(&courses, &params.q)))
}

async fn save_completed_handler(
    State(state): State<AppState>,
    Path(learner_id): Path<String>,
    payload: Result<Json<SaveCompletedCoursesRequest>, JsonRejection>,
) -> Result<Json<CompletedCoursesResponse>, ApiError> {
    let Json(request) = payload.map_err(|_| AppError::InvalidCourses.into_api(SAVE_FAILED))?;
    let codes = normalize_codes(request.courses);

    bounded(
        "completed course save",
        state.store_timeout,
        state.profiles.save_completed_courses(&learner_id, &codes),
    )
    .await
    .map_err(|e| e.into_api(SAVE_FAILED))?;

    info!(learner = %learner_id, courses = codes.len(), "completed courses saved");
    Ok(Json(CompletedCoursesResponse {
        message: Some("Courses saved successfully".to_string()),
        completed_courses: codes,
    }))
}

async fn completed_handler(
    State(state): State<AppState>,
    Path(learner_id): Path<String>,
) -> Result<Json<CompletedCoursesResponse>, ApiError> {
    let completed_courses = bounded(
        "completed course load",
        state.store_timeout,
        state.profiles.completed_courses(&learner_id),
    )
    .await
    .map_err(|e| e.into_api(LOAD_FAILED))?;

    Ok(Json(CompletedCoursesResponse {
        message: None,
        completed_courses,
    }))
}

async fn learner_recommend_handler(
    State(state): State<AppState>,
    Path(learner_id): Path<String>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let codes = bounded(
        "completed course load",
        state.store_timeout,
        state.profiles.completed_courses(&learner_id),
    )
    .await
    .map_err(|e| e.into_api(RECOMMEND_FAILED))?;

    state
        .recommender
        .recommend(Some(codes))
        .await
        .map(Json)
        .map_err(|e| e.into_api(RECOMMEND_FAILED))
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        redis: state.redis.is_available().await,
    })
}
