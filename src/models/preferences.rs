use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

/// Category caps for the preference profile.
pub const TOP_AUTHORS: usize = 5;
pub const TOP_SUBJECTS: usize = 8;
pub const TOP_DECADES: usize = 3;
pub const TOP_LANGUAGES: usize = 2;

/// Frequency counter that remembers first-insertion order, so that
/// equal-count entries keep a deterministic order after sorting.
#[derive(Debug, Default)]
pub struct FrequencyCounter<K> {
    entries: Vec<(K, u32)>,
    index: HashMap<K, usize>,
}

impl<K: Clone + Eq + Hash> FrequencyCounter<K> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn increment(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    /// Entries sorted descending by count (stable, so ties keep insertion
    /// order), truncated to `cap`.
    pub fn into_top(self, cap: usize) -> Vec<(K, u32)> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(cap);
        entries
    }
}

/// Aggregated taste signals derived from a user's favorites.
///
/// Ephemeral: rebuilt on every cache miss and discarded once the
/// recommendation list is produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserPreferenceProfile {
    /// (author display name, frequency), descending, capped at 5.
    pub top_authors: Vec<(String, u32)>,
    /// (normalized subject, frequency), capped at 8.
    pub top_subjects: Vec<(String, u32)>,
    /// (publication decade, frequency), capped at 3.
    pub top_decades: Vec<(i32, u32)>,
    /// (language code, frequency), capped at 2.
    pub top_languages: Vec<(String, u32)>,
    /// Favorites whose detail record was successfully fetched; may be lower
    /// than the favorites count on partial fetch failure.
    pub total_analyzed: usize,
}

impl UserPreferenceProfile {
    pub fn author_frequency(&self, name: &str) -> Option<u32> {
        self.top_authors
            .iter()
            .find(|(a, _)| a == name)
            .map(|&(_, count)| count)
    }

    pub fn subject_frequency(&self, normalized: &str) -> Option<u32> {
        self.top_subjects
            .iter()
            .find(|(s, _)| s == normalized)
            .map(|&(_, count)| count)
    }

    pub fn decade_frequency(&self, decade: i32) -> Option<u32> {
        self.top_decades
            .iter()
            .find(|&&(d, _)| d == decade)
            .map(|&(_, count)| count)
    }
}

/// Normalizes a subject tag for comparison: lowercase, strip everything that
/// is not a word character or whitespace, collapse runs of whitespace, trim.
pub fn normalize_subject(subject: &str) -> String {
    let lowered = subject.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
