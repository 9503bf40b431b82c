/// Open Library catalog provider
///
/// Wraps the three public endpoints this service needs:
/// 1. Search: /search.json?author=|subject=|q=...&limit=N
/// 2. Work details: /works/{id}.json
/// 3. Author lookup: /authors/{key}.json
///
/// Open Library publishes no SLA, so the shared HTTP client carries a
/// per-request timeout (see `Config::request_timeout_secs`).
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{AuthorRecord, RawBookRecord, WorkRecord},
    services::providers::CatalogProvider,
};

#[derive(Clone)]
pub struct OpenLibraryProvider {
    http_client: HttpClient,
    api_url: String,
}

impl OpenLibraryProvider {
    pub fn new(http_client: HttpClient, api_url: String) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    async fn search(&self, params: &[(&str, &str)]) -> AppResult<Vec<RawBookRecord>> {
        let url = format!("{}/search.json", self.api_url);

        let response = self.http_client.get(&url).query(params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Catalog search returned status {}: {}",
                status, body
            )));
        }

        #[derive(Deserialize)]
        struct SearchResponse {
            #[serde(default)]
            docs: Vec<RawBookRecord>,
        }

        let search_response: SearchResponse = response.json().await?;

        tracing::debug!(
            results = search_response.docs.len(),
            provider = "open_library",
            "Catalog search completed"
        );

        Ok(search_response.docs)
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        let response = self.http_client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Catalog returned status {} for {}: {}",
                status, url, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for OpenLibraryProvider {
    async fn search_by_author(&self, author: &str, limit: u32) -> AppResult<Vec<RawBookRecord>> {
        self.search(&[("author", author), ("limit", &limit.to_string())])
            .await
    }

    async fn search_by_subject(&self, subject: &str, limit: u32) -> AppResult<Vec<RawBookRecord>> {
        self.search(&[("subject", subject), ("limit", &limit.to_string())])
            .await
    }

    async fn search_by_keyword(&self, query: &str, limit: u32) -> AppResult<Vec<RawBookRecord>> {
        self.search(&[("q", query), ("limit", &limit.to_string())])
            .await
    }

    async fn fetch_work(&self, work_id: &str) -> AppResult<WorkRecord> {
        let id = work_id.trim_start_matches("/works/");
        let url = format!("{}/works/{}.json", self.api_url, id);
        self.fetch_json(&url).await
    }

    async fn fetch_author(&self, author_key: &str) -> AppResult<AuthorRecord> {
        // Work records reference authors as "/authors/{key}".
        let url = if author_key.starts_with('/') {
            format!("{}{}.json", self.api_url, author_key)
        } else {
            format!("{}/authors/{}.json", self.api_url, author_key)
        };
        self.fetch_json(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_provider() -> OpenLibraryProvider {
        OpenLibraryProvider::new(
            reqwest::Client::new(),
            "https://openlibrary.org/".to_string(),
        )
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let provider = create_test_provider();
        assert_eq!(provider.api_url, "https://openlibrary.org");
    }

    #[test]
    fn test_search_response_deserialization() {
        let json = r#"{
            "numFound": 1,
            "docs": [{
                "key": "/works/OL45883W",
                "title": "The Fellowship of the Ring",
                "author_name": ["J. R. R. Tolkien"],
                "first_publish_year": 1954,
                "cover_i": 9255566
            }]
        }"#;

        #[derive(Deserialize)]
        struct SearchResponse {
            #[serde(default)]
            docs: Vec<RawBookRecord>,
        }

        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.docs.len(), 1);
        assert_eq!(response.docs[0].key.as_deref(), Some("/works/OL45883W"));
        assert_eq!(response.docs[0].first_publish_year, Some(1954));
    }
}
