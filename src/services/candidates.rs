use std::sync::Arc;

use crate::models::{BookSummary, RawBookRecord, RecommendationCandidate};
use crate::services::providers::CatalogProvider;

/// Reason attached to every popularity-fallback candidate.
pub const POPULAR_REASON: &str = "Popular recommendation";

/// Generic queries used when the user has no favorites to learn from.
const POPULAR_TERMS: &[&str] = &[
    "popular fiction",
    "bestseller",
    "classic literature",
    "fantasy adventure",
    "mystery thriller",
    "science fiction",
    "historical fiction",
    "contemporary fiction",
    "biography",
];

/// Candidate search over the external catalog.
///
/// Every entry point swallows network failures per call: a failed search
/// contributes an empty result, never an error. The recommender degrades to
/// whatever the remaining searches produced.
#[derive(Clone)]
pub struct CandidateSearch {
    catalog: Arc<dyn CatalogProvider>,
    covers_base: String,
}

impl CandidateSearch {
    pub fn new(catalog: Arc<dyn CatalogProvider>, covers_base: String) -> Self {
        Self {
            catalog,
            covers_base,
        }
    }

    fn normalize_all(&self, docs: Vec<RawBookRecord>) -> Vec<BookSummary> {
        docs.into_iter()
            .map(|doc| BookSummary::from_raw(doc, &self.covers_base))
            .collect()
    }

    /// Candidates by author name.
    pub async fn by_author(&self, author: &str, limit: u32) -> Vec<BookSummary> {
        match self.catalog.search_by_author(author, limit).await {
            Ok(docs) => self.normalize_all(docs),
            Err(e) => {
                tracing::warn!(author = %author, error = %e, "Author search failed");
                Vec::new()
            }
        }
    }

    /// Candidates by subject tag, retried once as a keyword query when the
    /// subject filter matches nothing.
    pub async fn by_subject(&self, subject: &str, limit: u32) -> Vec<BookSummary> {
        match self.catalog.search_by_subject(subject, limit).await {
            Ok(docs) if !docs.is_empty() => self.normalize_all(docs),
            Ok(_) => match self.catalog.search_by_keyword(subject, limit).await {
                Ok(docs) => self.normalize_all(docs),
                Err(e) => {
                    tracing::warn!(subject = %subject, error = %e, "Keyword fallback search failed");
                    Vec::new()
                }
            },
            Err(e) => {
                tracing::warn!(subject = %subject, error = %e, "Subject search failed");
                Vec::new()
            }
        }
    }

    /// Popular candidates in a subject, using synonym terms until one of
    /// them yields results.
    pub async fn by_popular_subject(&self, subject: &str, limit: u32) -> Vec<BookSummary> {
        for term in subject_search_terms(subject) {
            match self
                .catalog
                .search_by_keyword(&term, limit.div_ceil(2))
                .await
            {
                Ok(docs) if !docs.is_empty() => {
                    let mut books = self.normalize_all(docs);
                    books.truncate(limit as usize);
                    return books;
                }
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(term = %term, error = %e, "Popular subject term failed");
                    continue;
                }
            }
        }

        // Last resort: the cleaned raw term at full limit.
        let cleaned = clean_subject_term(subject);
        match self.catalog.search_by_keyword(&cleaned, limit).await {
            Ok(docs) => self.normalize_all(docs),
            Err(e) => {
                tracing::warn!(subject = %subject, error = %e, "Popular subject fallback failed");
                Vec::new()
            }
        }
    }

    /// Non-personalized recommendations for users without favorites: small
    /// queries across generic popularity terms, random tiebreak scores.
    pub async fn general_recommendations(&self, limit: usize) -> Vec<RecommendationCandidate> {
        let mut recommendations = Vec::new();

        for term in POPULAR_TERMS {
            match self.catalog.search_by_keyword(term, 2).await {
                Ok(docs) => {
                    for book in self.normalize_all(docs) {
                        if book.id.is_none() {
                            continue;
                        }
                        recommendations.push(RecommendationCandidate::new(
                            book,
                            rand::random::<f64>(),
                            POPULAR_REASON.to_string(),
                        ));
                    }
                }
                Err(e) => {
                    tracing::warn!(term = %term, error = %e, "General recommendation search failed");
                }
            }

            if recommendations.len() >= limit {
                break;
            }
        }

        recommendations.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        recommendations.truncate(limit);
        recommendations
    }
}

/// Search terms to try for a subject: the raw subject first, then fixed
/// synonyms for the common tags.
fn subject_search_terms(subject: &str) -> Vec<String> {
    let mut terms = vec![subject.to_string()];

    let synonyms: &[&str] = match subject.to_lowercase().as_str() {
        "fiction" => &["fiction", "novel", "story"],
        "fantasy" => &["fantasy", "magic", "dragons"],
        "science_fiction" => &["science fiction", "sci-fi", "space"],
        "mystery" => &["mystery", "detective", "crime"],
        "biography" => &["biography", "memoir", "life story"],
        "history" => &["history", "historical", "past"],
        "romance" => &["romance", "love story", "romantic"],
        "thriller" => &["thriller", "suspense", "action"],
        "horror" => &["horror", "scary", "supernatural"],
        "poetry" => &["poetry", "poems", "verse"],
        _ => &[],
    };

    terms.extend(synonyms.iter().map(|s| s.to_string()));
    terms
}

fn clean_subject_term(subject: &str) -> String {
    subject.replace(['_', '-'], " ")
}
