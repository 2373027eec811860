use course_common::error::CommonError;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("upstream returned error: status={status} body={body}")]
    Upstream { status: StatusCode, body: String },

    #[error("graphql errors: {0}")]
    GraphQl(String),
}
