/// Error types shared across the course services.
///
/// These errors represent failures in infrastructure components (Redis, the catalog file)
/// that are common to the recommender and the catalog loader. Application-specific errors
/// are defined in each binary crate and wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("redis unavailable")]
    RedisUnavailable,

    #[error("invalid stored JSON: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("catalog file error: {0}")]
    CatalogFile(String),
}
