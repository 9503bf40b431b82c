/// External data source abstractions
///
/// The recommendation engine talks to two upstreams: the public book catalog
/// (search, work details, author names) and the EmmBook favorites API. Both
/// sit behind traits so the engine can be exercised without the network.
use crate::{
    error::AppResult,
    models::{AuthorRecord, FavoriteEntry, RawBookRecord, WorkRecord},
};

#[cfg(test)]
use mockall::automock;

pub mod favorites;
pub mod open_library;

pub use favorites::HttpFavoritesSource;
pub use open_library::OpenLibraryProvider;

/// Read-only book catalog.
///
/// All methods return raw wire records; normalization into [`crate::models::BookSummary`]
/// happens in the candidate-search layer.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search works filtered by author name.
    async fn search_by_author(&self, author: &str, limit: u32) -> AppResult<Vec<RawBookRecord>>;

    /// Search works filtered by subject tag.
    async fn search_by_subject(&self, subject: &str, limit: u32) -> AppResult<Vec<RawBookRecord>>;

    /// Generic keyword search.
    async fn search_by_keyword(&self, query: &str, limit: u32) -> AppResult<Vec<RawBookRecord>>;

    /// Fetch the full work record for a catalog id (no "/works/" prefix).
    async fn fetch_work(&self, work_id: &str) -> AppResult<WorkRecord>;

    /// Fetch an author record by key ("/authors/OL26320A" or bare id).
    async fn fetch_author(&self, author_key: &str) -> AppResult<AuthorRecord>;
}

/// The authenticated favorites store, read-only to this service.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait FavoritesSource: Send + Sync {
    /// List the user's current favorites.
    async fn list_favorites(&self) -> AppResult<Vec<FavoriteEntry>>;
}
