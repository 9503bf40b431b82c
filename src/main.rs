use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use emmbook_recs::{
    api::{create_router, AppState},
    config::Config,
    services::{
        providers::{HttpFavoritesSource, OpenLibraryProvider},
        RecommendationService,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;

    let catalog = Arc::new(OpenLibraryProvider::new(
        http_client.clone(),
        config.catalog_api_url.clone(),
    ));
    let favorites = Arc::new(HttpFavoritesSource::new(
        http_client,
        config.favorites_api_url.clone(),
        config.favorites_api_token.clone(),
    ));

    let recommendations = Arc::new(RecommendationService::new(
        catalog,
        favorites,
        config.covers_base_url.clone(),
        Duration::from_secs(config.cache_ttl_secs),
    ));

    let app = create_router(AppState::new(recommendations));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "EmmBook recommendation service listening");
    axum::serve(listener, app).await?;

    Ok(())
}
