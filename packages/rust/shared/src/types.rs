//! Core domain types: manifest entries, documents, and the persisted catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order assigned to documents that declare none, so they sort last.
pub const DEFAULT_ORDER: i64 = 999;

/// Category assigned to documents that declare none.
pub const DEFAULT_CATEGORY: &str = "General";

// ---------------------------------------------------------------------------
// ManifestEntry
// ---------------------------------------------------------------------------

/// One hand-maintained line of the document source manifest.
///
/// Manifest values always win over anything embedded in the fetched file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path relative to the content host base URL (e.g. `docs/COMMANDS.md`).
    pub path: String,
    /// Catalog grouping label.
    pub category: String,
    /// Sort key within the catalog.
    pub order: i64,
    /// Optional display title overriding front matter and headings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ManifestEntry {
    /// Convenience constructor without a title override.
    pub fn new(path: impl Into<String>, category: impl Into<String>, order: i64) -> Self {
        Self {
            path: path.into(),
            category: category.into(),
            order,
            title: None,
        }
    }

    /// Attach a title override.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// One processed unit of documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier derived from the source path.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Markdown body with front matter stripped.
    pub content: String,
    /// Catalog sort key.
    pub order: i64,
    /// Catalog grouping label.
    pub category: String,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The sorted document collection written to `docs.json`.
///
/// `docs` is stored pre-sorted; consumers must keep its order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Documents in catalog order.
    pub docs: Vec<Document>,
    /// When this catalog was generated.
    #[serde(rename = "lastUpdated", with = "iso_millis")]
    pub last_updated: DateTime<Utc>,
}

impl Catalog {
    /// Look up a document by slug.
    pub fn get(&self, slug: &str) -> Option<&Document> {
        self.docs.iter().find(|d| d.slug == slug)
    }

    /// Number of documents per category, in first-appearance order.
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for doc in &self.docs {
            match counts.iter_mut().find(|(c, _)| *c == doc.category) {
                Some((_, n)) => *n += 1,
                None => counts.push((doc.category.clone(), 1)),
            }
        }
        counts
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
