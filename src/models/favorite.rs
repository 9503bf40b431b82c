use serde::{Deserialize, Serialize};

/// A favorited book as stored by the EmmBook favorites API.
///
/// `authors` is a pre-joined display string produced by the frontend at
/// save time. Author lists are re-derived from the catalog work record, never
/// by splitting this string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub book_id: String,
    pub book_title: String,
    #[serde(default)]
    pub book_cover_id: Option<String>,
    #[serde(default)]
    pub authors: Option<String>,
}

/// Response envelope of `GET /api/favorites`.
#[derive(Debug, Clone, Deserialize)]
pub struct FavoritesResponse {
    #[serde(default)]
    pub favorites: Vec<FavoriteEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favorite_entry_deserialization() {
        let json = r#"{
            "bookId": "OL45883W",
            "bookTitle": "The Fellowship of the Ring",
            "bookCoverId": "9255566",
            "authors": "J. R. R. Tolkien"
        }"#;

        let entry: FavoriteEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.book_id, "OL45883W");
        assert_eq!(entry.book_title, "The Fellowship of the Ring");
        assert_eq!(entry.book_cover_id.as_deref(), Some("9255566"));
        assert_eq!(entry.authors.as_deref(), Some("J. R. R. Tolkien"));
    }

    #[test]
    fn test_favorites_response_missing_list() {
        let response: FavoritesResponse = serde_json::from_str("{}").unwrap();
        assert!(response.favorites.is_empty());
    }
}
