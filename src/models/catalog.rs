use serde::Deserialize;

/// Work record from `GET /works/{id}.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<WorkAuthorRef>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub first_publish_date: Option<String>,
    #[serde(default)]
    pub languages: Vec<KeyRef>,
}

/// Author reference inside a work record: `{"author": {"key": "/authors/OL26320A"}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkAuthorRef {
    #[serde(default)]
    pub author: Option<KeyRef>,
}

/// Keyed reference, e.g. `{"key": "/languages/eng"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyRef {
    pub key: String,
}

impl KeyRef {
    /// The identifier with its namespace prefix ("/languages/", "/authors/",
    /// ...) stripped.
    pub fn bare_id(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

/// Author record from `GET /authors/{key}.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorRecord {
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_record_deserialization() {
        let json = r#"{
            "title": "The Fellowship of the Ring",
            "authors": [{"author": {"key": "/authors/OL26320A"}}],
            "subjects": ["Fantasy fiction", "Quests (Expeditions)"],
            "first_publish_date": "July 29, 1954",
            "languages": [{"key": "/languages/eng"}]
        }"#;

        let work: WorkRecord = serde_json::from_str(json).unwrap();
        assert_eq!(work.authors.len(), 1);
        assert_eq!(
            work.authors[0].author.as_ref().unwrap().key,
            "/authors/OL26320A"
        );
        assert_eq!(work.subjects.len(), 2);
        assert_eq!(work.languages[0].bare_id(), "eng");
    }

    #[test]
    fn test_work_record_all_fields_optional() {
        let work: WorkRecord = serde_json::from_str("{}").unwrap();
        assert!(work.authors.is_empty());
        assert!(work.subjects.is_empty());
        assert_eq!(work.first_publish_date, None);
    }

    #[test]
    fn test_key_ref_bare_id() {
        let key = KeyRef {
            key: "/authors/OL26320A".to_string(),
        };
        assert_eq!(key.bare_id(), "OL26320A");
    }
}
