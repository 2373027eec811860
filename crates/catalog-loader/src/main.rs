mod config;
mod error;
mod source;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use course_common::catalog::{RedisCatalog, RECOMMENDATIONS_PREFIX};
use course_common::redis::RedisCache;

use config::Config;
use source::{read_catalog_file, GraphQlSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = Config::from_env()?;

    let courses = match &config.source_file {
        Some(path) => read_catalog_file(path)?,
        None => {
            info!(
                url = %config.graphql.url,
                timeout_secs = config.graphql.timeout.as_secs(),
                max_retries = config.graphql.retry.max_retries,
                "fetching catalog"
            );
            GraphQlSource::new(config.graphql.clone())?
                .fetch_courses()
                .await
                .inspect_err(|e| tracing::error!(error = %e, "catalog fetch failed"))?
        }
    };

    if courses.is_empty() {
        warn!("no courses returned, catalog left unchanged");
        return Ok(());
    }

    let redis = RedisCache::new(Some(&config.redis_url));
    let catalog = RedisCatalog::new(redis.clone());
    let written = catalog.upsert(&courses).await?;
    let total = catalog.count().await?;
    info!(written, total, "catalog upserted");

    match redis.delete_by_prefix(RECOMMENDATIONS_PREFIX).await {
        Some(removed) => info!(removed, "cached recommendations invalidated"),
        None => warn!("could not invalidate cached recommendations"),
    }

    Ok(())
}
