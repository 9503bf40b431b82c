use serde::{Deserialize, Serialize};

/// Sentinel title for records with no title field.
pub const UNKNOWN_TITLE: &str = "Unknown title";

/// Sentinel author name. `BookSummary::author_names` is never empty; absent
/// author data degrades to a one-element list holding this value.
pub const UNKNOWN_AUTHOR: &str = "Unknown author";

/// Placeholder asset served by the frontend when no cover exists.
pub const DEFAULT_COVER: &str = "/images/default-book-cover.jpg";

/// Raw book record as returned by the catalog search and work endpoints.
///
/// Open Library is inconsistent about field names and shapes across its
/// endpoints, so every field is optional and the author field in particular
/// arrives in several different forms (see [`RawAuthors`]).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBookRecord {
    /// Work key of the form "/works/OL123W".
    #[serde(default)]
    pub key: Option<String>,
    /// Explicit identifier, present on some already-normalized payloads.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Search endpoint shape: a plain list of display names.
    #[serde(default)]
    pub author_name: Option<Vec<String>>,
    /// Work endpoint / legacy shapes: list of strings, list of objects, or a
    /// single pre-joined display string.
    #[serde(default)]
    pub authors: Option<RawAuthors>,
    /// Single author as one string.
    #[serde(default)]
    pub author: Option<String>,
    /// Edition-level statement of responsibility ("by J. R. R. Tolkien").
    #[serde(default)]
    pub by_statement: Option<String>,
    #[serde(default)]
    pub subject: Option<Vec<String>>,
    #[serde(default)]
    pub subjects: Option<Vec<String>>,
    #[serde(default)]
    pub first_publish_year: Option<i64>,
    #[serde(default)]
    pub first_publish_date: Option<String>,
    #[serde(default)]
    pub cover_i: Option<i64>,
    #[serde(default)]
    pub cover_id: Option<i64>,
    #[serde(default)]
    pub covers: Option<Vec<i64>>,
}

/// The author field shapes the catalog uses, as a tagged union instead of
/// per-call-site duck typing.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAuthors {
    /// List of names or `{ "name": ... }` objects.
    Entries(Vec<RawAuthorEntry>),
    /// Single pre-joined display string ("A. Author, B. Author").
    Joined(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAuthorEntry {
    Name(String),
    Object {
        #[serde(default)]
        name: Option<String>,
    },
}

/// Canonical normalized book shape used for favorites and candidates alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    /// Catalog identifier with the "/works/" namespace stripped. `None` when
    /// the record carries no usable identifier; such summaries are
    /// non-recommendable and never enter the candidate map.
    pub id: Option<String>,
    pub title: String,
    /// Ordered author display names, never empty.
    pub author_names: Vec<String>,
    /// Raw subject tags, not yet normalized.
    pub subjects: Vec<String>,
    /// Publication year or date string, kept only to derive a decade.
    pub first_publish: Option<String>,
    pub cover_id: Option<i64>,
    pub cover_url: String,
}

impl BookSummary {
    /// Normalizes a raw catalog record. Pure and infallible: every missing or
    /// malformed field degrades to a documented sentinel.
    pub fn from_raw(raw: RawBookRecord, covers_base: &str) -> Self {
        let id = raw
            .key
            .as_deref()
            .map(|key| key.trim_start_matches("/works/").to_string())
            .filter(|id| !id.is_empty())
            .or(raw.id);

        let title = raw
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        let author_names = extract_author_names(
            raw.author_name,
            raw.authors,
            raw.author,
            raw.by_statement,
        );

        let subjects = raw
            .subject
            .or(raw.subjects)
            .unwrap_or_default();

        let first_publish = raw
            .first_publish_year
            .map(|y| y.to_string())
            .or(raw.first_publish_date);

        let cover_id = raw
            .cover_i
            .or(raw.cover_id)
            .or_else(|| raw.covers.and_then(|c| c.first().copied()));

        let cover_url = match cover_id {
            Some(cover) => format!("{}/{}-M.jpg", covers_base.trim_end_matches('/'), cover),
            None => DEFAULT_COVER.to_string(),
        };

        Self {
            id,
            title,
            author_names,
            subjects,
            first_publish,
            cover_id,
            cover_url,
        }
    }

    /// Publication decade (`floor(year / 10) * 10`), if a 4-digit year can be
    /// found in the publish field.
    pub fn decade(&self) -> Option<i32> {
        self.first_publish.as_deref().and_then(extract_decade)
    }
}

/// Author-extraction precedence, tried in order, first match wins.
fn extract_author_names(
    author_name: Option<Vec<String>>,
    authors: Option<RawAuthors>,
    author: Option<String>,
    by_statement: Option<String>,
) -> Vec<String> {
    // 1. Explicit name list from the search endpoint.
    if let Some(names) = author_name {
        if !names.is_empty() {
            return names;
        }
    }

    match authors {
        // 2. List of names or objects.
        Some(RawAuthors::Entries(entries)) if !entries.is_empty() => {
            return entries
                .into_iter()
                .map(|entry| match entry {
                    RawAuthorEntry::Name(name) => name,
                    RawAuthorEntry::Object { name } => {
                        name.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
                    }
                })
                .collect();
        }
        // 4. Single pre-joined display string, kept as one entry, not split.
        Some(RawAuthors::Joined(joined)) => {
            // 3. A bare `author` string outranks the joined form.
            if let Some(single) = author {
                return vec![single];
            }
            return vec![joined];
        }
        _ => {}
    }

    // 3. Single author string.
    if let Some(single) = author {
        return vec![single];
    }

    // 5. Statement of responsibility as one display string.
    if let Some(statement) = by_statement {
        return vec![statement];
    }

    // 6. Sentinel.
    vec![UNKNOWN_AUTHOR.to_string()]
}

/// Extracts the first 4-digit year from a date string and maps it to its
/// decade. "October 1937" -> 1930, "1954-07-29" -> 1950.
pub fn extract_decade(date: &str) -> Option<i32> {
    let bytes = date.as_bytes();
    let mut run = 0usize;
    for (i, b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            run += 1;
            if run == 4 {
                // Reject longer digit runs (e.g. a raw cover id).
                if bytes.get(i + 1).is_some_and(|n| n.is_ascii_digit()) {
                    run = 0;
                    continue;
                }
                let year: i32 = date[i + 1 - 4..=i].parse().ok()?;
                return Some(year / 10 * 10);
            }
        } else {
            run = 0;
        }
    }
    None
}
