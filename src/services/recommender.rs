use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::models::preferences::normalize_subject;
use crate::models::{BookSummary, FavoriteEntry, RecommendationCandidate, UserPreferenceProfile};
use crate::services::analyzer;
use crate::services::candidates::CandidateSearch;
use crate::services::providers::{CatalogProvider, FavoritesSource};

// Pass shapes: how many profile entries each pass walks, how many candidates
// it requests per entry, and its affinity weight.
const AUTHOR_PASS_AUTHORS: usize = 3;
const AUTHOR_PASS_LIMIT: u32 = 8;
const AUTHOR_PASS_WEIGHT: f64 = 0.4;

const SUBJECT_PASS_SUBJECTS: usize = 4;
const SUBJECT_PASS_LIMIT: u32 = 6;
const SUBJECT_PASS_WEIGHT: f64 = 0.35;

const POPULAR_PASS_SUBJECTS: usize = 2;
const POPULAR_PASS_LIMIT: u32 = 5;
const POPULAR_PASS_BONUS: f64 = 0.25;

// Base-score weights for signals the surfacing pass did not itself reward.
const BASE_AUTHOR_WEIGHT: f64 = 0.3;
const BASE_SUBJECT_WEIGHT: f64 = 0.2;
const BASE_DECADE_WEIGHT: f64 = 0.1;

/// Score a candidate against the profile independently of the pass that
/// surfaced it: matching authors, normalized subjects, and decade each add
/// their frequency times a fixed weight.
pub fn base_score(book: &BookSummary, profile: &UserPreferenceProfile) -> f64 {
    let mut score = 0.0;

    for author in &book.author_names {
        if let Some(count) = profile.author_frequency(author) {
            score += count as f64 * BASE_AUTHOR_WEIGHT;
        }
    }

    for subject in &book.subjects {
        if let Some(count) = profile.subject_frequency(&normalize_subject(subject)) {
            score += count as f64 * BASE_SUBJECT_WEIGHT;
        }
    }

    if let Some(decade) = book.decade() {
        if let Some(count) = profile.decade_frequency(decade) {
            score += count as f64 * BASE_DECADE_WEIGHT;
        }
    }

    score
}

/// Deduplicating candidate map keyed by catalog id.
///
/// Insertion order is preserved so the final stable sort has a deterministic
/// tie order. Favorited ids and id-less candidates never enter the map; on
/// collision the strictly higher-scoring copy (with its reason) wins.
struct CandidateMap {
    entries: Vec<RecommendationCandidate>,
    index: HashMap<String, usize>,
    excluded: HashSet<String>,
}

impl CandidateMap {
    fn new(favorites: &[FavoriteEntry]) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            excluded: favorites.iter().map(|f| f.book_id.clone()).collect(),
        }
    }

    fn insert(&mut self, candidate: RecommendationCandidate) {
        let Some(id) = candidate.book.id.clone() else {
            return;
        };
        if self.excluded.contains(&id) {
            return;
        }
        match self.index.get(&id) {
            Some(&i) => {
                if candidate.score > self.entries[i].score {
                    self.entries[i] = candidate;
                }
            }
            None => {
                self.index.insert(id, self.entries.len());
                self.entries.push(candidate);
            }
        }
    }

    fn into_ranked(self, limit: usize) -> Vec<RecommendationCandidate> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        entries.truncate(limit);
        entries
    }
}

/// Runs the three weighted passes and merges them into a ranked list.
/// Deterministic given identical inputs and search responses.
pub async fn recommend(
    candidates: &CandidateSearch,
    profile: &UserPreferenceProfile,
    favorites: &[FavoriteEntry],
    limit: usize,
) -> Vec<RecommendationCandidate> {
    let mut map = CandidateMap::new(favorites);

    // Pass A: author affinity.
    for (author, count) in profile.top_authors.iter().take(AUTHOR_PASS_AUTHORS) {
        for book in candidates.by_author(author, AUTHOR_PASS_LIMIT).await {
            let score = base_score(&book, profile) + *count as f64 * AUTHOR_PASS_WEIGHT;
            map.insert(RecommendationCandidate::new(
                book,
                score,
                format!("Because you like {}", author),
            ));
        }
    }

    // Pass B: subject affinity.
    for (subject, count) in profile.top_subjects.iter().take(SUBJECT_PASS_SUBJECTS) {
        for book in candidates.by_subject(subject, SUBJECT_PASS_LIMIT).await {
            let score = base_score(&book, profile) + *count as f64 * SUBJECT_PASS_WEIGHT;
            map.insert(RecommendationCandidate::new(
                book,
                score,
                format!("Based on your interest in {}", subject),
            ));
        }
    }

    // Pass C: popular titles in the strongest subjects, flat bonus.
    for (subject, _) in profile.top_subjects.iter().take(POPULAR_PASS_SUBJECTS) {
        for book in candidates
            .by_popular_subject(subject, POPULAR_PASS_LIMIT)
            .await
        {
            let score = base_score(&book, profile) + POPULAR_PASS_BONUS;
            map.insert(RecommendationCandidate::new(
                book,
                score,
                format!("Popular in {}", subject),
            ));
        }
    }

    map.into_ranked(limit)
}

struct CachedSet {
    entries: Vec<RecommendationCandidate>,
    /// Instant the producing computation *started*, so an invalidation fired
    /// mid-compute marks the landed result stale.
    computed_at: Instant,
}

/// Recommendation engine with a short-TTL in-memory cache.
///
/// One instance is owned by the application state and injected into the API
/// layer. The cache lives for the process lifetime only and holds at most the
/// last computed set.
pub struct RecommendationService {
    catalog: Arc<dyn CatalogProvider>,
    favorites: Arc<dyn FavoritesSource>,
    candidates: CandidateSearch,
    ttl: Duration,
    cache: Mutex<Option<CachedSet>>,
    invalidated_at: Mutex<Option<Instant>>,
    /// Serializes computations so a burst of concurrent callers produces one
    /// upstream fetch storm; waiters re-check the cache once they acquire it.
    compute_lock: Mutex<()>,
}

impl RecommendationService {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        favorites: Arc<dyn FavoritesSource>,
        covers_base: String,
        ttl: Duration,
    ) -> Self {
        let candidates = CandidateSearch::new(catalog.clone(), covers_base);
        Self {
            catalog,
            favorites,
            candidates,
            ttl,
            cache: Mutex::new(None),
            invalidated_at: Mutex::new(None),
            compute_lock: Mutex::new(()),
        }
    }

    /// Returns up to `limit` ranked recommendations, recomputing only when
    /// the cached set is missing, older than the TTL, or invalidated.
    ///
    /// The cache is not limit-aware: a cached set shorter than `limit` is
    /// returned as-is, so callers should request their maximum needed size
    /// up front.
    pub async fn get_recommendations(&self, limit: usize) -> AppResult<Vec<RecommendationCandidate>> {
        if let Some(entries) = self.cached(limit).await {
            tracing::debug!(count = entries.len(), "Serving recommendations from cache");
            return Ok(entries);
        }

        let _guard = self.compute_lock.lock().await;

        // Another caller may have computed while we waited for the lock.
        if let Some(entries) = self.cached(limit).await {
            return Ok(entries);
        }

        let started = Instant::now();
        let entries = self.compute(limit).await?;

        *self.cache.lock().await = Some(CachedSet {
            entries: entries.clone(),
            computed_at: started,
        });

        Ok(entries)
    }

    /// Forces the next `get_recommendations` call to recompute, regardless of
    /// TTL. Safe to call while a computation is in flight: the in-flight
    /// result still lands in the cache but is already stale.
    pub async fn invalidate(&self) {
        *self.invalidated_at.lock().await = Some(Instant::now());
        tracing::info!("Recommendation cache invalidated");
    }

    async fn cached(&self, limit: usize) -> Option<Vec<RecommendationCandidate>> {
        let invalidated_at = *self.invalidated_at.lock().await;
        let cache = self.cache.lock().await;
        let set = cache.as_ref()?;

        if set.computed_at.elapsed() >= self.ttl {
            return None;
        }
        if let Some(invalidated) = invalidated_at {
            if set.computed_at <= invalidated {
                return None;
            }
        }

        Some(set.entries.iter().take(limit).cloned().collect())
    }

    async fn compute(&self, limit: usize) -> AppResult<Vec<RecommendationCandidate>> {
        let favorites = match self.favorites.list_favorites().await {
            Ok(favorites) => favorites,
            Err(e) => {
                tracing::warn!(error = %e, "Favorites unreachable, using popularity fallback");
                Vec::new()
            }
        };

        let entries = if favorites.is_empty() {
            self.candidates.general_recommendations(limit).await
        } else {
            let profile = analyzer::analyze(self.catalog.clone(), &favorites).await;
            let personalized = recommend(&self.candidates, &profile, &favorites, limit).await;
            if personalized.is_empty() {
                // Nothing matched (or every search failed): degrade to the
                // non-personalized set rather than an empty answer.
                tracing::warn!("Personalized passes produced no candidates, using popularity fallback");
                self.candidates.general_recommendations(limit).await
            } else {
                personalized
            }
        };

        if entries.is_empty() {
            return Err(AppError::ExternalApi(
                "No recommendations could be produced".to_string(),
            ));
        }

        tracing::info!(
            count = entries.len(),
            personalized = !favorites.is_empty(),
            "Recommendations computed"
        );

        Ok(entries)
    }
}
