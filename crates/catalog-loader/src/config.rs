use std::path::PathBuf;
use std::time::Duration;

use course_common::retry::RetryPolicy;

use crate::error::LoaderError;
use crate::source::GraphQlConfig;

const DEFAULT_GRAPHQL_URL: &str = "https://graphql.csesoc.app/v1/graphql";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    /// Local catalog document; skips the GraphQL fetch when set.
    pub source_file: Option<PathBuf>,
    pub graphql: GraphQlConfig,
}

impl Config {
    /// Required: `REDIS_URL`.
    /// Optional: `CATALOG_GRAPHQL_URL`, `CATALOG_SOURCE_FILE`,
    /// `LOADER_TIMEOUT_SECS` (default 30), `LOADER_MAX_RETRIES` (default 3).
    pub fn from_env() -> Result<Self, LoaderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, LoaderError> {
        let non_empty = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let redis_url = non_empty("REDIS_URL").ok_or_else(|| {
            LoaderError::Config("REDIS_URL environment variable is required".to_string())
        })?;

        let url = non_empty("CATALOG_GRAPHQL_URL").unwrap_or_else(|| DEFAULT_GRAPHQL_URL.to_string());

        let timeout_secs = match non_empty("LOADER_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    LoaderError::Config(format!("LOADER_TIMEOUT_SECS must be a positive integer, got '{raw}'"))
                })?,
        };

        let max_retries = match non_empty("LOADER_MAX_RETRIES") {
            None => DEFAULT_MAX_RETRIES,
            Some(raw) => raw.parse::<u32>().map_err(|e| {
                LoaderError::Config(format!("invalid LOADER_MAX_RETRIES '{raw}': {e}"))
            })?,
        };

        Ok(Self {
            redis_url,
            source_file: non_empty("CATALOG_SOURCE_FILE").map(PathBuf::from),
            graphql: GraphQlConfig {
                url,
                timeout: Duration::from_secs(timeout_secs),
                retry: RetryPolicy {
                    max_retries,
                    ..RetryPolicy::default()
                },
                ..GraphQlConfig::default()
            },
        })
    }
}
