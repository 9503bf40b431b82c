pub mod book;
pub mod catalog;
pub mod favorite;
pub mod preferences;
pub mod recommendation;

pub use book::{BookSummary, RawAuthorEntry, RawAuthors, RawBookRecord};
pub use catalog::{AuthorRecord, KeyRef, WorkAuthorRef, WorkRecord};
pub use favorite::{FavoriteEntry, FavoritesResponse};
pub use preferences::UserPreferenceProfile;
pub use recommendation::RecommendationCandidate;
