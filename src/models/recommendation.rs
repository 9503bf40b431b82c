use serde::{Deserialize, Serialize};

use super::book::BookSummary;

/// A scored candidate returned to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationCandidate {
    #[serde(flatten)]
    pub book: BookSummary,
    pub score: f64,
    /// Human-readable justification ("Because you like Tolkien").
    pub reason: String,
}

impl RecommendationCandidate {
    pub fn new(book: BookSummary, score: f64, reason: String) -> Self {
        Self { book, score, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_serializes_flat() {
        let candidate = RecommendationCandidate::new(
            BookSummary {
                id: Some("OL1W".to_string()),
                title: "The Hobbit".to_string(),
                author_names: vec!["J. R. R. Tolkien".to_string()],
                subjects: vec![],
                first_publish: Some("1937".to_string()),
                cover_id: None,
                cover_url: crate::models::book::DEFAULT_COVER.to_string(),
            },
            1.6,
            "Because you like J. R. R. Tolkien".to_string(),
        );

        let value = serde_json::to_value(&candidate).unwrap();
        assert_eq!(value["id"], "OL1W");
        assert_eq!(value["title"], "The Hobbit");
        assert_eq!(value["score"], 1.6);
        assert_eq!(value["reason"], "Because you like J. R. R. Tolkien");
    }
}
