use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_CACHE_TTL_SECS: u64 = 3_600;

/// Service configuration loaded explicitly from environment variables.
///
/// At least one catalog source is required. When both are given the catalog
/// file wins and Redis still backs learner profiles and the result cache.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// Redis connection URL (e.g. "redis://127.0.0.1:6379").
    pub redis_url: Option<String>,
    /// JSON catalog file served from memory instead of the Redis catalog.
    pub catalog_path: Option<PathBuf>,
    /// Upper bound on any single catalog or profile store call.
    pub store_timeout: Duration,
    /// Recommendation cache TTL; 0 disables the cache.
    pub cache_ttl_secs: u64,
    /// Single allowed CORS origin; `None` allows any origin.
    pub cors_allow_origin: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional (at least one of the first two is required):
    /// - `REDIS_URL`: Redis connection string
    /// - `CATALOG_PATH`: JSON catalog file
    /// - `COURSE_RECOMMENDER_ADDR` (default "0.0.0.0:5000")
    /// - `STORE_TIMEOUT_MS` (default 5000)
    /// - `RECOMMENDATION_CACHE_TTL_SECS` (default 3600)
    /// - `CORS_ALLOW_ORIGIN`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let non_empty = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let listen_addr = non_empty("COURSE_RECOMMENDER_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = listen_addr.parse().map_err(|e| {
            AppError::Config(format!("invalid COURSE_RECOMMENDER_ADDR '{listen_addr}': {e}"))
        })?;

        let redis_url = non_empty("REDIS_URL");
        let catalog_path = non_empty("CATALOG_PATH").map(PathBuf::from);

        match (&redis_url, &catalog_path) {
            (None, None) => {
                return Err(AppError::Config(
                    "either REDIS_URL or CATALOG_PATH environment variable is required".to_string(),
                ))
            }
            (_, Some(path)) if !Path::new(path).is_file() => {
                return Err(AppError::Config(format!(
                    "catalog file not found at {}",
                    path.display()
                )))
            }
            _ => {}
        }

        let store_timeout = parse_u64(&non_empty, "STORE_TIMEOUT_MS", DEFAULT_STORE_TIMEOUT_MS)?;
        if store_timeout == 0 {
            return Err(AppError::Config("STORE_TIMEOUT_MS must be positive".to_string()));
        }
        let cache_ttl_secs =
            parse_u64(&non_empty, "RECOMMENDATION_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;

        Ok(Self {
            listen_addr,
            redis_url,
            catalog_path,
            store_timeout: Duration::from_millis(store_timeout),
            cache_ttl_secs,
            cors_allow_origin: non_empty("CORS_ALLOW_ORIGIN"),
        })
    }
}

fn parse_u64(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64, AppError> {
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|e| AppError::Config(format!("invalid {key} '{raw}': {e}"))),
    }
}
