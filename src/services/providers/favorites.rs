use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::{FavoriteEntry, FavoritesResponse},
    services::providers::FavoritesSource,
};

/// Favorites client for the EmmBook API.
///
/// The frontend authenticates users; this service only carries the bearer
/// token it was configured with.
#[derive(Clone)]
pub struct HttpFavoritesSource {
    http_client: HttpClient,
    api_url: String,
    token: String,
}

impl HttpFavoritesSource {
    pub fn new(http_client: HttpClient, api_url: String, token: String) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }
}

#[async_trait::async_trait]
impl FavoritesSource for HttpFavoritesSource {
    async fn list_favorites(&self) -> AppResult<Vec<FavoriteEntry>> {
        let url = format!("{}/api/favorites", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Favorites API returned status {}: {}",
                status, body
            )));
        }

        let favorites: FavoritesResponse = response.json().await?;

        tracing::debug!(
            count = favorites.favorites.len(),
            "Fetched favorites"
        );

        Ok(favorites.favorites)
    }
}
