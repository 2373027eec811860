mod cache;
mod config;
mod error;
mod pool;
mod profile;
mod recommend;
mod scoring;
mod search;
mod server;
mod text;
mod tiering;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use course_common::catalog::{CatalogStore, MemoryCatalog, RedisCatalog};
use course_common::redis::RedisCache;

use cache::RecommendationCache;
use config::Config;
use profile::{MemoryProfiles, ProfileStore, RedisProfiles};
use recommend::RecommendationService;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting course-recommender");

    let config = Config::from_env()?;
    info!(
        addr = %config.listen_addr,
        store_timeout_ms = config.store_timeout.as_millis(),
        cache_ttl_secs = config.cache_ttl_secs,
        "configuration loaded"
    );

    let redis = RedisCache::new(config.redis_url.as_deref());
    if redis.is_available().await {
        info!("redis connected");
    } else if redis.is_configured() {
        info!("redis unreachable, requests will fail until it recovers");
    } else {
        info!("redis not configured, learner profiles are kept in memory");
    }

    let catalog: Arc<dyn CatalogStore> = match &config.catalog_path {
        Some(path) => {
            let catalog = MemoryCatalog::from_json_file(path)?;
            info!(path = %path.display(), courses = catalog.len(), "catalog loaded from file");
            Arc::new(catalog)
        }
        None => {
            let catalog = RedisCatalog::new(redis.clone());
            match catalog.count().await {
                Ok(count) => info!(courses = count, "serving catalog from redis"),
                Err(e) => error!(error = %e, "could not count redis catalog"),
            }
            Arc::new(catalog)
        }
    };

    let profiles: Arc<dyn ProfileStore> = if redis.is_configured() {
        Arc::new(RedisProfiles::new(redis.clone()))
    } else {
        Arc::new(MemoryProfiles::new())
    };

    let recommender = Arc::new(RecommendationService::new(
        Arc::clone(&catalog),
        RecommendationCache::new(redis.clone(), config.cache_ttl_secs),
        config.store_timeout,
    ));
    let cors = server::cors_layer(config.cors_allow_origin.as_deref())?;
    let state = AppState::new(recommender, catalog, profiles, redis, config.store_timeout);
    let app = server::router(state, cors);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("course-recommender shut down");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        match ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }
}
