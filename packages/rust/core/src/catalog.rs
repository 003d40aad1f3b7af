//! Reading and writing the persisted catalog artifact.

use std::path::Path;

use tracing::{debug, instrument};

use nizam_docs_shared::{Catalog, DocsError, Result};

/// Write `catalog` as pretty-printed JSON to `path`, replacing any previous
/// artifact. Missing parent directories are created.
#[instrument(skip(catalog), fields(docs = catalog.docs.len()))]
pub fn persist(catalog: &Catalog, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DocsError::io(parent, e))?;
    }

    let mut json = serde_json::to_string_pretty(catalog)
        .map_err(|e| DocsError::parse(format!("failed to serialize catalog: {e}")))?;
    json.push('\n');

    std::fs::write(path, json).map_err(|e| DocsError::io(path, e))?;
    debug!(path = %path.display(), "catalog persisted");
    Ok(())
}

/// Read a catalog artifact. Document order is kept exactly as stored.
pub fn load(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path).map_err(|e| DocsError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| DocsError::parse(format!("invalid catalog {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use nizam_docs_shared::Document;

    fn catalog(slugs: &[&str]) -> Catalog {
        Catalog {
            docs: slugs
                .iter()
                .enumerate()
                .map(|(i, slug)| Document {
                    slug: slug.to_string(),
                    title: slug.to_uppercase(),
                    content: format!("Content of {slug}"),
                    order: i as i64,
                    category: "General".into(),
                })
                .collect(),
            last_updated: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
        }
    }

    #[test]
    fn persist_creates_directories_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("public").join("nested").join("docs.json");
        let original = catalog(&["readme", "docs-readme", "docs-commands"]);

        persist(&original, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, original);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"lastUpdated\": \"2024-01-15T10:30:00.000Z\""));
    }

    #[test]
    fn persist_overwrites_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.json");

        persist(&catalog(&["old-one", "old-two"]), &path).unwrap();
        persist(&catalog(&["new"]), &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.docs.len(), 1);
        assert_eq!(loaded.docs[0].slug, "new");
    }

    #[test]
    fn load_keeps_stored_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.json");
        std::fs::write(
            &path,
            r#"{"docs":[
                {"slug":"z","title":"Z","content":"","order":9,"category":"General"},
                {"slug":"a","title":"A","content":"","order":1,"category":"General"}
            ],"lastUpdated":"2024-01-15T10:30:00.123Z"}"#,
        )
        .unwrap();

        let loaded = load(&path).unwrap();
        let slugs: Vec<&str> = loaded.docs.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, ["z", "a"]);
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent.json")).unwrap_err().is_io());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(load(&bad).unwrap_err(), DocsError::Parse { .. }));
    }
}
