//! Catalog build pipeline: manifest → fetch → normalize → sort → persist.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, instrument, warn};

use nizam_docs_fetcher::{DocumentSource, FetchOptions, FetchOutcome, HttpSource};
use nizam_docs_markdown::{normalize_entry, slugify_path};
use nizam_docs_shared::{AppConfig, Catalog, DocsError, ManifestEntry, Result};

use crate::catalog;

/// A manifest entry that did not make it into the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: String,
}

/// Output of [`build_catalog`].
#[derive(Debug, Clone)]
pub struct BuiltCatalog {
    pub catalog: Catalog,
    pub skipped: Vec<SkippedEntry>,
}

/// Result of [`run_build`].
#[derive(Debug)]
pub struct BuildReport {
    /// Where the catalog was written.
    pub catalog_path: PathBuf,
    /// Number of documents in the catalog.
    pub doc_count: usize,
    /// Entries left out, with the reason.
    pub skipped: Vec<SkippedEntry>,
    /// Documents per category, in catalog order.
    pub categories: Vec<(String, usize)>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting build status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before each manifest entry is fetched.
    fn entry_started(&self, path: &str, current: usize, total: usize);
    /// Called when an entry is left out of the catalog.
    fn entry_skipped(&self, path: &str, reason: &str);
    /// Called when the build completes.
    fn done(&self, report: &BuildReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn entry_started(&self, _path: &str, _current: usize, _total: usize) {}
    fn entry_skipped(&self, _path: &str, _reason: &str) {}
    fn done(&self, _report: &BuildReport) {}
}

// ---------------------------------------------------------------------------
// Manifest validation
// ---------------------------------------------------------------------------

/// Derive the slug of every manifest entry, rejecting empty paths and
/// entries that collapse onto the same slug.
pub fn validate_manifest(manifest: &[ManifestEntry]) -> Result<Vec<String>> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut slugs = Vec::with_capacity(manifest.len());

    for entry in manifest {
        if entry.path.trim().is_empty() {
            return Err(DocsError::validation(format!(
                "manifest entry with order {} has an empty path",
                entry.order
            )));
        }

        let slug = slugify_path(&entry.path);
        if slug.is_empty() {
            return Err(DocsError::validation(format!(
                "manifest path '{}' does not produce a slug",
                entry.path
            )));
        }
        if let Some(first) = seen.insert(slug.clone(), &entry.path) {
            return Err(DocsError::validation(format!(
                "manifest paths '{first}' and '{}' both map to slug '{slug}'",
                entry.path
            )));
        }
        slugs.push(slug);
    }

    Ok(slugs)
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Fetch and normalize every manifest entry in declaration order.
///
/// Entries that are missing, fail to fetch or fail to normalize are logged
/// and skipped. The collected documents are stably sorted by `order`, so ties
/// keep manifest order.
#[instrument(skip_all, fields(entries = manifest.len()))]
pub async fn build_catalog<S: DocumentSource>(
    manifest: &[ManifestEntry],
    source: &S,
    progress: &dyn ProgressReporter,
) -> Result<BuiltCatalog> {
    validate_manifest(manifest)?;

    let total = manifest.len();
    let mut docs = Vec::with_capacity(total);
    let mut skipped = Vec::new();

    for (i, entry) in manifest.iter().enumerate() {
        progress.entry_started(&entry.path, i + 1, total);

        let raw = match source.fetch(&entry.path).await {
            Ok(FetchOutcome::Found(raw)) => raw,
            Ok(FetchOutcome::NotFound) => {
                let location = source.locate(&entry.path);
                warn!(path = %entry.path, %location, "not found, skipping entry");
                skip(&mut skipped, progress, &entry.path, "not found".to_string());
                continue;
            }
            Err(e) => {
                warn!(path = %entry.path, error = %e, "fetch failed, skipping entry");
                skip(&mut skipped, progress, &entry.path, e.to_string());
                continue;
            }
        };

        match normalize_entry(entry, &raw) {
            Ok(doc) => docs.push(doc),
            Err(e) => {
                warn!(path = %entry.path, error = %e, "processing failed, skipping entry");
                skip(&mut skipped, progress, &entry.path, e.to_string());
            }
        }
    }

    docs.sort_by_key(|doc| doc.order);
    info!(docs = docs.len(), skipped = skipped.len(), "catalog assembled");

    Ok(BuiltCatalog {
        catalog: Catalog {
            docs,
            last_updated: Utc::now(),
        },
        skipped,
    })
}

fn skip(
    skipped: &mut Vec<SkippedEntry>,
    progress: &dyn ProgressReporter,
    path: &str,
    reason: String,
) {
    progress.entry_skipped(path, &reason);
    skipped.push(SkippedEntry {
        path: path.to_string(),
        reason,
    });
}

/// Run the full build: fetch from the configured source, then write the
/// catalog to `out` (or the configured catalog path).
///
/// Only configuration, manifest validation and persistence failures are
/// returned as errors.
#[instrument(skip_all, fields(base = %config.source.base_url))]
pub async fn run_build(
    config: &AppConfig,
    out: Option<&Path>,
    progress: &dyn ProgressReporter,
) -> Result<BuildReport> {
    let start = Instant::now();

    let source = HttpSource::new(
        &config.source.base_url,
        &FetchOptions {
            timeout_secs: config.source.timeout_secs,
        },
    )?;

    progress.phase("Fetching documents");
    let built = build_catalog(&config.manifest, &source, progress).await?;

    progress.phase("Writing catalog");
    let catalog_path = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.output.catalog_path.clone());
    catalog::persist(&built.catalog, &catalog_path)?;

    let categories = built.catalog.category_counts();
    for (category, count) in &categories {
        info!(%category, count, "category");
    }

    let report = BuildReport {
        catalog_path,
        doc_count: built.catalog.docs.len(),
        skipped: built.skipped,
        categories,
        elapsed: start.elapsed(),
    };

    info!(
        docs = report.doc_count,
        skipped = report.skipped.len(),
        path = %report.catalog_path.display(),
        "catalog written"
    );
    progress.done(&report);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use nizam_docs_shared::{DEFAULT_CATEGORY, default_manifest};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// In-memory source keyed by path. Missing paths are 404s; paths mapped to
    /// `None` fail like a broken connection.
    struct MapSource(HashMap<&'static str, Option<&'static str>>);

    impl DocumentSource for MapSource {
        async fn fetch(&self, path: &str) -> Result<FetchOutcome> {
            match self.0.get(path) {
                Some(Some(text)) => Ok(FetchOutcome::Found(text.to_string())),
                Some(None) => Err(DocsError::Network(format!("{path}: connection reset"))),
                None => Ok(FetchOutcome::NotFound),
            }
        }

        fn locate(&self, path: &str) -> String {
            format!("mem://{path}")
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        skipped: Mutex<Vec<String>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, _name: &str) {}
        fn entry_started(&self, _path: &str, _current: usize, _total: usize) {}
        fn entry_skipped(&self, path: &str, _reason: &str) {
            self.skipped.lock().unwrap().push(path.to_string());
        }
        fn done(&self, _report: &BuildReport) {}
    }

    #[tokio::test]
    async fn missing_file_is_skipped_and_heading_becomes_title() {
        let manifest = vec![
            ManifestEntry::new("a.md", DEFAULT_CATEGORY, 1),
            ManifestEntry::new("b.md", DEFAULT_CATEGORY, 2),
        ];
        let source = MapSource(HashMap::from([("b.md", Some("# Hello\n\nBody"))]));
        let progress = RecordingProgress::default();

        let built = build_catalog(&manifest, &source, &progress).await.unwrap();

        assert_eq!(built.catalog.docs.len(), 1);
        let doc = &built.catalog.docs[0];
        assert_eq!(doc.slug, "b");
        assert_eq!(doc.title, "Hello");
        assert_eq!(doc.content, "Body");
        assert_eq!(
            built.skipped,
            vec![SkippedEntry {
                path: "a.md".into(),
                reason: "not found".into()
            }]
        );
        assert_eq!(*progress.skipped.lock().unwrap(), vec!["a.md".to_string()]);
    }

    #[tokio::test]
    async fn fetch_errors_do_not_abort_the_build() {
        let manifest = vec![
            ManifestEntry::new("broken.md", "X", 1),
            ManifestEntry::new("ok.md", "X", 2),
        ];
        let source = MapSource(HashMap::from([("broken.md", None), ("ok.md", Some("ok"))]));

        let built = build_catalog(&manifest, &source, &SilentProgress).await.unwrap();
        assert_eq!(built.catalog.docs.len(), 1);
        assert_eq!(built.skipped[0].path, "broken.md");
        assert!(built.skipped[0].reason.contains("connection reset"));
    }

    #[tokio::test]
    async fn sort_is_by_order_and_stable_on_ties() {
        let manifest = vec![
            ManifestEntry::new("z.md", "X", 5),
            ManifestEntry::new("first-tie.md", "X", 2),
            ManifestEntry::new("a.md", "X", 1),
            ManifestEntry::new("second-tie.md", "X", 2),
        ];
        let source = MapSource(HashMap::from([
            ("z.md", Some("z")),
            ("first-tie.md", Some("1")),
            ("a.md", Some("a")),
            ("second-tie.md", Some("2")),
        ]));

        let built = build_catalog(&manifest, &source, &SilentProgress).await.unwrap();
        let slugs: Vec<&str> = built.catalog.docs.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, ["a", "first-tie", "second-tie", "z"]);
    }

    #[tokio::test]
    async fn manifest_overrides_file_metadata() {
        let manifest = vec![ManifestEntry::new("docs/DOCTOR.md", "Features", 5).with_title("Doctor")];
        let source = MapSource(HashMap::from([(
            "docs/DOCTOR.md",
            Some("---\ntitle: Other\norder: 1\ncategory: Misc\n---\n# Heading\n\nText"),
        )]));

        let built = build_catalog(&manifest, &source, &SilentProgress).await.unwrap();
        let doc = &built.catalog.docs[0];
        assert_eq!(doc.slug, "docs-doctor");
        assert_eq!(doc.title, "Doctor");
        assert_eq!(doc.order, 5);
        assert_eq!(doc.category, "Features");
    }

    #[tokio::test]
    async fn colliding_slugs_fail_before_any_fetch() {
        struct PanicSource;
        impl DocumentSource for PanicSource {
            async fn fetch(&self, path: &str) -> Result<FetchOutcome> {
                panic!("fetched {path}");
            }
            fn locate(&self, path: &str) -> String {
                path.to_string()
            }
        }

        let manifest = vec![
            ManifestEntry::new("docs/README.md", "A", 1),
            ManifestEntry::new("Docs/readme.md", "B", 2),
        ];
        let err = build_catalog(&manifest, &PanicSource, &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, DocsError::Validation { .. }));
        assert!(err.to_string().contains("docs-readme"));
    }

    #[test]
    fn default_manifest_slugs_are_distinct() {
        let slugs = validate_manifest(&default_manifest()).unwrap();
        assert_eq!(slugs.len(), 8);
        assert_eq!(slugs[0], "readme");
        assert_eq!(slugs[7], "examples-interactive-demo");
    }

    #[test]
    fn empty_manifest_path_is_rejected() {
        let err = validate_manifest(&[ManifestEntry::new("  ", "A", 3)]).unwrap_err();
        assert!(err.to_string().contains("empty path"));
    }

    #[tokio::test]
    async fn run_build_fetches_over_http_and_persists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/README.md"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# Nizam\n\nIntro"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/docs/DOCTOR.md"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("public").join("docs.json");

        let mut config = AppConfig::default();
        config.source.base_url = server.uri();
        config.manifest = vec![
            ManifestEntry::new("README.md", "Overview", 1),
            ManifestEntry::new("docs/DOCTOR.md", "Features", 5),
            ManifestEntry::new("docs/MISSING.md", "Features", 6),
        ];

        let report = run_build(&config, Some(&out), &SilentProgress).await.unwrap();
        assert_eq!(report.doc_count, 1);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.categories, vec![("Overview".to_string(), 1)]);
        assert_eq!(report.catalog_path, out);

        let loaded = catalog::load(&out).unwrap();
        assert_eq!(loaded.docs[0].title, "Nizam");
        assert_eq!(loaded.docs[0].content, "Intro");
    }

    #[tokio::test]
    async fn run_build_fails_when_catalog_cannot_be_written() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("text"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("public");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut config = AppConfig::default();
        config.source.base_url = server.uri();
        config.manifest = vec![ManifestEntry::new("README.md", "Overview", 1)];

        let err = run_build(&config, Some(&blocker.join("docs.json")), &SilentProgress)
            .await
            .unwrap_err();
        assert!(err.is_io());
    }
}
