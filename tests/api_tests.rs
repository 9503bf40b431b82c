use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;

use emmbook_recs::api::{create_router, AppState};
use emmbook_recs::error::AppResult;
use emmbook_recs::models::{
    AuthorRecord, FavoriteEntry, KeyRef, RawBookRecord, WorkAuthorRef, WorkRecord,
};
use emmbook_recs::services::providers::{CatalogProvider, FavoritesSource};
use emmbook_recs::services::RecommendationService;

const COVERS: &str = "https://covers.openlibrary.org/b/id";

fn doc(key: &str, title: &str) -> RawBookRecord {
    RawBookRecord {
        key: Some(format!("/works/{}", key)),
        title: Some(title.to_string()),
        ..Default::default()
    }
}

/// Catalog stub returning fixed, deterministic data.
struct StubCatalog;

#[async_trait::async_trait]
impl CatalogProvider for StubCatalog {
    async fn search_by_author(&self, author: &str, _limit: u32) -> AppResult<Vec<RawBookRecord>> {
        Ok(vec![
            doc("OLA1W", &format!("More by {}", author)),
            // The favorited work also shows up here and must be excluded.
            doc("OLFAV1W", "Already favorited"),
        ])
    }

    async fn search_by_subject(&self, subject: &str, _limit: u32) -> AppResult<Vec<RawBookRecord>> {
        Ok(vec![doc("OLS1W", &format!("About {}", subject))])
    }

    async fn search_by_keyword(&self, query: &str, _limit: u32) -> AppResult<Vec<RawBookRecord>> {
        Ok(vec![doc("OLK1W", &format!("Found for {}", query))])
    }

    async fn fetch_work(&self, _work_id: &str) -> AppResult<WorkRecord> {
        Ok(WorkRecord {
            title: Some("The Fellowship of the Ring".to_string()),
            authors: vec![WorkAuthorRef {
                author: Some(KeyRef {
                    key: "/authors/OL26320A".to_string(),
                }),
            }],
            subjects: vec!["Fantasy fiction".to_string()],
            first_publish_date: Some("July 29, 1954".to_string()),
            languages: vec![KeyRef {
                key: "/languages/eng".to_string(),
            }],
        })
    }

    async fn fetch_author(&self, _author_key: &str) -> AppResult<AuthorRecord> {
        Ok(AuthorRecord {
            name: Some("J. R. R. Tolkien".to_string()),
        })
    }
}

struct StubFavorites {
    favorites: Vec<FavoriteEntry>,
}

#[async_trait::async_trait]
impl FavoritesSource for StubFavorites {
    async fn list_favorites(&self) -> AppResult<Vec<FavoriteEntry>> {
        Ok(self.favorites.clone())
    }
}

fn create_test_server(favorites: Vec<FavoriteEntry>) -> TestServer {
    let service = Arc::new(RecommendationService::new(
        Arc::new(StubCatalog),
        Arc::new(StubFavorites { favorites }),
        COVERS.to_string(),
        Duration::from_secs(120),
    ));
    let app = create_router(AppState::new(service));
    TestServer::new(app).unwrap()
}

fn one_favorite() -> Vec<FavoriteEntry> {
    vec![FavoriteEntry {
        book_id: "OLFAV1W".to_string(),
        book_title: "The Fellowship of the Ring".to_string(),
        book_cover_id: Some("9255566".to_string()),
        authors: Some("J. R. R. Tolkien".to_string()),
    }]
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(vec![]);
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_get_recommendations_personalized() {
    let server = create_test_server(one_favorite());

    let response = server.get("/api/recommendations").await;
    response.assert_status_ok();

    let recommendations: Vec<serde_json::Value> = response.json();
    assert!(!recommendations.is_empty());

    for rec in &recommendations {
        assert_ne!(rec["id"], "OLFAV1W", "favorited work must never come back");
        assert!(rec["score"].as_f64().is_some());
        assert!(!rec["reason"].as_str().unwrap().is_empty());
    }

    // Sorted descending by score.
    let scores: Vec<f64> = recommendations
        .iter()
        .map(|r| r["score"].as_f64().unwrap())
        .collect();
    for pair in scores.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
}

#[tokio::test]
async fn test_get_recommendations_without_favorites_is_popular_only() {
    let server = create_test_server(vec![]);

    let response = server.get("/api/recommendations").await;
    response.assert_status_ok();

    let recommendations: Vec<serde_json::Value> = response.json();
    assert!(!recommendations.is_empty());
    for rec in &recommendations {
        assert_eq!(rec["reason"], "Popular recommendation");
    }
}

#[tokio::test]
async fn test_limit_respected() {
    let server = create_test_server(one_favorite());

    let response = server.get("/api/recommendations?limit=1").await;
    response.assert_status_ok();

    let recommendations: Vec<serde_json::Value> = response.json();
    assert_eq!(recommendations.len(), 1);
}

#[tokio::test]
async fn test_limit_zero_rejected() {
    let server = create_test_server(vec![]);
    let response = server.get("/api/recommendations?limit=0").await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_limit_above_max_rejected() {
    let server = create_test_server(vec![]);
    let response = server.get("/api/recommendations?limit=51").await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalidate_returns_no_content() {
    let server = create_test_server(one_favorite());
    let response = server.post("/api/recommendations/invalidate").await;
    response.assert_status(axum::http::StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_repeated_calls_are_idempotent() {
    let server = create_test_server(one_favorite());

    let first: Vec<serde_json::Value> = server.get("/api/recommendations").await.json();
    let second: Vec<serde_json::Value> = server.get("/api/recommendations").await.json();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let server = create_test_server(vec![]);
    let response = server.get("/health").await;
    assert!(response.headers().contains_key("x-request-id"));
}
