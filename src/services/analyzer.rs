use std::collections::HashMap;
use std::sync::Arc;

use crate::models::book::{extract_decade, UNKNOWN_AUTHOR};
use crate::models::preferences::{
    normalize_subject, FrequencyCounter, TOP_AUTHORS, TOP_DECADES, TOP_LANGUAGES, TOP_SUBJECTS,
};
use crate::models::{FavoriteEntry, UserPreferenceProfile, WorkRecord};
use crate::services::providers::CatalogProvider;

/// Builds a preference profile from the user's favorites.
///
/// Fetches every favorite's work record in parallel; a favorite whose lookup
/// fails is excluded from aggregation and the analysis proceeds with the
/// remainder. Author references are resolved with one call per unique key;
/// a failed author lookup degrades that reference to the sentinel name.
pub async fn analyze(
    catalog: Arc<dyn CatalogProvider>,
    favorites: &[FavoriteEntry],
) -> UserPreferenceProfile {
    let works = fetch_work_details(catalog.clone(), favorites).await;

    let mut authors = FrequencyCounter::new();
    let mut subjects = FrequencyCounter::new();
    let mut decades = FrequencyCounter::new();
    let mut languages = FrequencyCounter::new();

    // Author names memoized per key: one lookup per unique reference.
    let mut author_names: HashMap<String, String> = HashMap::new();

    for work in &works {
        for author_ref in &work.authors {
            let Some(key) = author_ref.author.as_ref().map(|a| a.key.clone()) else {
                continue;
            };
            let name = match author_names.get(&key) {
                Some(name) => name.clone(),
                None => {
                    let name = resolve_author_name(catalog.as_ref(), &key).await;
                    author_names.insert(key, name.clone());
                    name
                }
            };
            authors.increment(name);
        }

        for subject in &work.subjects {
            let normalized = normalize_subject(subject);
            if !normalized.is_empty() {
                subjects.increment(normalized);
            }
        }

        if let Some(decade) = work.first_publish_date.as_deref().and_then(extract_decade) {
            decades.increment(decade);
        }

        for language in &work.languages {
            languages.increment(language.bare_id().to_string());
        }
    }

    let profile = UserPreferenceProfile {
        top_authors: authors.into_top(TOP_AUTHORS),
        top_subjects: subjects.into_top(TOP_SUBJECTS),
        top_decades: decades.into_top(TOP_DECADES),
        top_languages: languages.into_top(TOP_LANGUAGES),
        total_analyzed: works.len(),
    };

    tracing::info!(
        favorites = favorites.len(),
        analyzed = profile.total_analyzed,
        top_authors = profile.top_authors.len(),
        top_subjects = profile.top_subjects.len(),
        "Preference analysis completed"
    );

    profile
}

/// Fetches all work records in parallel, dropping the ones that fail.
async fn fetch_work_details(
    catalog: Arc<dyn CatalogProvider>,
    favorites: &[FavoriteEntry],
) -> Vec<WorkRecord> {
    let mut tasks = Vec::new();

    for favorite in favorites {
        let catalog = catalog.clone();
        let book_id = favorite.book_id.clone();
        let task = tokio::spawn(async move {
            let result = catalog.fetch_work(&book_id).await;
            (book_id, result)
        });
        tasks.push(task);
    }

    let mut works = Vec::new();
    let mut failures = 0;

    for task in tasks {
        match task.await {
            Ok((_, Ok(work))) => works.push(work),
            Ok((book_id, Err(e))) => {
                tracing::warn!(book_id = %book_id, error = %e, "Work lookup failed, excluding favorite");
                failures += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, "Task join error");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        tracing::warn!(
            success_count = works.len(),
            error_count = failures,
            "Partial work detail fetch failure"
        );
    }

    works
}

async fn resolve_author_name(catalog: &dyn CatalogProvider, key: &str) -> String {
    match catalog.fetch_author(key).await {
        Ok(author) => author.name.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        Err(e) => {
            tracing::warn!(author_key = %key, error = %e, "Author lookup failed, using sentinel name");
            UNKNOWN_AUTHOR.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::catalog::{AuthorRecord, KeyRef, WorkAuthorRef};
    use crate::services::providers::MockCatalogProvider;
    use mockall::predicate::eq;

    fn favorite(book_id: &str) -> FavoriteEntry {
        FavoriteEntry {
            book_id: book_id.to_string(),
            book_title: "A Book".to_string(),
            book_cover_id: None,
            authors: None,
        }
    }

    fn work(author_key: Option<&str>, subjects: &[&str], date: Option<&str>) -> WorkRecord {
        WorkRecord {
            title: None,
            authors: author_key
                .map(|key| {
                    vec![WorkAuthorRef {
                        author: Some(KeyRef {
                            key: key.to_string(),
                        }),
                    }]
                })
                .unwrap_or_default(),
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            first_publish_date: date.map(|d| d.to_string()),
            languages: vec![KeyRef {
                key: "/languages/eng".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_analyze_aggregates_frequencies() {
        let mut catalog = MockCatalogProvider::new();
        let tolkien_work = work(
            Some("/authors/OL26320A"),
            &["Fantasy fiction", "Quests (Expeditions)"],
            Some("July 29, 1954"),
        );
        let other = tolkien_work.clone();

        catalog
            .expect_fetch_work()
            .with(eq("OL1W"))
            .return_once(move |_| Ok(tolkien_work));
        catalog
            .expect_fetch_work()
            .with(eq("OL2W"))
            .return_once(move |_| Ok(other));
        // Same author reference in both works: exactly one lookup.
        catalog
            .expect_fetch_author()
            .with(eq("/authors/OL26320A"))
            .times(1)
            .returning(|_| {
                Ok(AuthorRecord {
                    name: Some("J. R. R. Tolkien".to_string()),
                })
            });

        let catalog: Arc<dyn CatalogProvider> = Arc::new(catalog);
        let profile = analyze(catalog, &[favorite("OL1W"), favorite("OL2W")]).await;

        assert_eq!(profile.total_analyzed, 2);
        assert_eq!(
            profile.top_authors,
            vec![("J. R. R. Tolkien".to_string(), 2)]
        );
        assert_eq!(profile.subject_frequency("fantasy fiction"), Some(2));
        assert_eq!(profile.subject_frequency("quests expeditions"), Some(2));
        assert_eq!(profile.top_decades, vec![(1950, 2)]);
        assert_eq!(profile.top_languages, vec![("eng".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_failed_work_lookup_excludes_favorite() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_fetch_work()
            .with(eq("OL1W"))
            .returning(|_| Err(AppError::ExternalApi("boom".to_string())));
        catalog
            .expect_fetch_work()
            .with(eq("OL2W"))
            .return_once(|_| Ok(work(None, &["Fantasy"], None)));

        let catalog: Arc<dyn CatalogProvider> = Arc::new(catalog);
        let profile = analyze(catalog, &[favorite("OL1W"), favorite("OL2W")]).await;

        assert_eq!(profile.total_analyzed, 1);
        assert_eq!(profile.subject_frequency("fantasy"), Some(1));
    }

    #[tokio::test]
    async fn test_failed_author_lookup_degrades_to_sentinel() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_fetch_work()
            .return_once(|_| Ok(work(Some("/authors/OL1A"), &[], None)));
        catalog
            .expect_fetch_author()
            .returning(|_| Err(AppError::ExternalApi("boom".to_string())));

        let catalog: Arc<dyn CatalogProvider> = Arc::new(catalog);
        let profile = analyze(catalog, &[favorite("OL1W")]).await;

        assert_eq!(profile.top_authors, vec![(UNKNOWN_AUTHOR.to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_unparseable_date_contributes_no_decade() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_fetch_work()
            .return_once(|_| Ok(work(None, &[], Some("n.d."))));

        let catalog: Arc<dyn CatalogProvider> = Arc::new(catalog);
        let profile = analyze(catalog, &[favorite("OL1W")]).await;

        assert!(profile.top_decades.is_empty());
    }
}
