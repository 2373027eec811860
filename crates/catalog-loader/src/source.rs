/// Catalog sources for the loader: the upstream GraphQL endpoint, or a local
/// JSON document in the same shape.
use std::path::Path;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use course_common::catalog::parse_catalog_json;
use course_common::error::CommonError;
use course_common::model::CourseRecord;
use course_common::retry::RetryPolicy;

use crate::error::LoaderError;

const COURSES_QUERY: &str = "query AllCourses {
  courses {
    course_code
    course_name
    uoc
    faculty
    school
    campus
    career
    terms
    modes
  }
}";

#[derive(Debug, Clone)]
pub struct GraphQlConfig {
    pub url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub max_error_body_bytes: usize,
}

impl Default for GraphQlConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            max_error_body_bytes: 8 * 1024,
        }
    }
}

pub struct GraphQlSource {
    config: GraphQlConfig,
    http: reqwest::Client,
}

impl GraphQlSource {
    pub fn new(config: GraphQlConfig) -> Result<Self, LoaderError> {
        let http = reqwest::Client::builder()
            .user_agent("course-recommender/catalog-loader")
            .build()?;
        Ok(Self { config, http })
    }

    /// Fetch every course. GraphQL-level errors are not retried.
    pub async fn fetch_courses(&self) -> Result<Vec<CourseRecord>, LoaderError> {
        let body = json!({ "query": COURSES_QUERY, "variables": {} });
        let text = self
            .config
            .retry
            .run("catalog fetch", should_retry, || async {
                let resp = self
                    .http
                    .post(&self.config.url)
                    .timeout(self.config.timeout)
                    .json(&body)
                    .send()
                    .await?;
                let status = resp.status();
                if !status.is_success() {
                    let body = error_body(resp, self.config.max_error_body_bytes).await;
                    return Err(LoaderError::Upstream { status, body });
                }
                Ok(resp.text().await?)
            })
            .await?;

        let courses = decode_courses(&text)?;
        info!(url = %self.config.url, courses = courses.len(), "catalog fetched");
        Ok(courses)
    }
}

/// Read a catalog document from disk.
pub fn read_catalog_file(path: &Path) -> Result<Vec<CourseRecord>, LoaderError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CommonError::CatalogFile(format!("failed to read {}: {e}", path.display()))
    })?;
    let courses = parse_catalog_json(&content)?;
    info!(path = %path.display(), courses = courses.len(), "catalog file read");
    Ok(courses)
}

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    data: Option<CoursesData>,
    #[serde(default)]
    errors: Vec<GraphQlErrorObject>,
}

#[derive(Debug, Deserialize)]
struct CoursesData {
    #[serde(default)]
    courses: Vec<CourseRecord>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorObject {
    message: String,
}

fn decode_courses(text: &str) -> Result<Vec<CourseRecord>, LoaderError> {
    let envelope: GraphQlEnvelope = serde_json::from_str(text)?;
    if !envelope.errors.is_empty() {
        let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
        return Err(LoaderError::GraphQl(messages.join("; ")));
    }

    let courses = envelope.data.map(|d| d.courses).unwrap_or_default();
    Ok(courses
        .into_iter()
        .filter(|c| {
            let keep = !c.code.trim().is_empty();
            if !keep {
                warn!(name = %c.name, "skipping upstream course without a code");
            }
            keep
        })
        .collect())
}

fn should_retry(err: &LoaderError) -> bool {
    match err {
        LoaderError::Request(e) => {
            e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() || e.is_decode()
        }
        LoaderError::Upstream { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
        LoaderError::InvalidJson(_)
        | LoaderError::GraphQl(_)
        | LoaderError::Config(_)
        | LoaderError::Common(_) => false,
    }
}

/// Upstream error body, cut to `limit` bytes.
async fn error_body(resp: reqwest::Response, limit: usize) -> String {
    match resp.bytes().await {
        Ok(bytes) => String::from_utf8_lossy(&bytes[..bytes.len().min(limit)]).into_owned(),
        Err(e) => {
            warn!(error = %e, "failed to read upstream error body");
            String::new()
        }
    }
}
