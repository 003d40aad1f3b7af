//! Raw Markdown retrieval from the remote content host.
//!
//! Every manifest path is fetched with a plain `GET {base}/{path}`. A 404 is
//! reported as [`FetchOutcome::NotFound`] so callers can tell a missing file
//! apart from a transport or server failure. There is no caching and no retry:
//! every call goes to the network.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument, warn};

use nizam_docs_shared::{DocsError, Result};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Default timeout in seconds for a single fetch.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent string for content requests.
const USER_AGENT: &str = concat!("nizam-docs/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// FetchOutcome
// ---------------------------------------------------------------------------

/// Result of a fetch that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The file exists; holds its UTF-8 text.
    Found(String),
    /// The server answered 404.
    NotFound,
}

impl FetchOutcome {
    /// The fetched text, if any.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Found(text) => Some(text),
            Self::NotFound => None,
        }
    }
}

// ---------------------------------------------------------------------------
// DocumentSource
// ---------------------------------------------------------------------------

/// Anything that can hand out raw Markdown for a relative path.
///
/// The catalog builder is generic over this so tests can run without a network.
pub trait DocumentSource {
    /// Retrieve the text stored at `path`.
    fn fetch(&self, path: &str) -> impl Future<Output = Result<FetchOutcome>> + Send;

    /// Human-readable location of `path`, used in logs.
    fn locate(&self, path: &str) -> String;
}

// ---------------------------------------------------------------------------
// FetchOptions
// ---------------------------------------------------------------------------

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Timeout for HTTP requests in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// HttpSource
// ---------------------------------------------------------------------------

/// Fetches files from `{base}/{path}` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base: String,
}

impl HttpSource {
    /// Create a source rooted at `base_url`. A trailing `/` is ignored.
    pub fn new(base_url: &str, opts: &FetchOptions) -> Result<Self> {
        url::Url::parse(base_url)
            .map_err(|e| DocsError::config(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client: build_client(opts)?,
            base: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The normalized base URL.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Build the request URL for a relative path.
    pub fn url_for(&self, path: &str) -> Result<String> {
        let path = path.trim();
        if path.is_empty() {
            return Err(DocsError::validation("fetch path must not be empty"));
        }
        if path.starts_with('/') || path.contains("://") {
            return Err(DocsError::validation(format!(
                "fetch path must be relative: '{path}'"
            )));
        }
        Ok(format!("{}/{path}", self.base))
    }
}

impl DocumentSource for HttpSource {
    #[instrument(skip(self), fields(base = %self.base))]
    async fn fetch(&self, path: &str) -> Result<FetchOutcome> {
        let url = self.url_for(path)?;
        info!(%url, "fetching");

        let outcome = fetch_text(&self.client, &url).await?;
        if outcome == FetchOutcome::NotFound {
            warn!(path, "file not found");
        }
        Ok(outcome)
    }

    fn locate(&self, path: &str) -> String {
        self.url_for(path).unwrap_or_else(|_| path.to_string())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &FetchOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| DocsError::Network(format!("failed to build HTTP client: {e}")))
}

/// GET `url`, mapping 404 to [`FetchOutcome::NotFound`] and any other
/// non-success status to [`DocsError::Status`].
async fn fetch_text(client: &Client, url: &str) -> Result<FetchOutcome> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DocsError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(FetchOutcome::NotFound);
    }
    if !status.is_success() {
        return Err(DocsError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| DocsError::Network(format!("{url}: failed to read body: {e}")))?;

    debug!(%url, len = body.len(), "fetched");
    Ok(FetchOutcome::Found(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(base: &str) -> HttpSource {
        HttpSource::new(base, &FetchOptions::default()).unwrap()
    }

    #[test]
    fn url_for_joins_base_and_path() {
        let src = source("https://raw.example.com/org/repo/main/");
        assert_eq!(
            src.url_for("docs/COMMANDS.md").unwrap(),
            "https://raw.example.com/org/repo/main/docs/COMMANDS.md"
        );
    }

    #[test]
    fn url_for_rejects_empty_and_absolute_paths() {
        let src = source("https://raw.example.com/repo");
        assert!(src.url_for("").is_err());
        assert!(src.url_for("   ").is_err());
        assert!(src.url_for("/etc/passwd").is_err());
        assert!(src.url_for("https://evil.example.com/x.md").is_err());
    }

    #[test]
    fn invalid_base_is_a_config_error() {
        let err = HttpSource::new("raw content please", &FetchOptions::default()).unwrap_err();
        assert!(err.to_string().starts_with("config error"));
    }

    #[tokio::test]
    async fn fetch_returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/docs/DOCTOR.md"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# Doctor\n\nChecks."))
            .mount(&server)
            .await;

        let outcome = source(&server.uri()).fetch("docs/DOCTOR.md").await.unwrap();
        assert_eq!(outcome, FetchOutcome::Found("# Doctor\n\nChecks.".into()));
    }

    #[tokio::test]
    async fn fetch_maps_404_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.md"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let outcome = source(&server.uri()).fetch("missing.md").await.unwrap();
        assert_eq!(outcome, FetchOutcome::NotFound);
        assert_eq!(outcome.into_text(), None);
    }

    #[tokio::test]
    async fn fetch_reports_other_statuses_as_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky.md"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = source(&server.uri()).fetch("flaky.md").await.unwrap_err();
        match err {
            DocsError::Status { status, url } => {
                assert_eq!(status, 503);
                assert!(url.ends_with("/flaky.md"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_reports_transport_failures() {
        // Nothing listens on port 9 locally; the connection is refused.
        let err = source("http://127.0.0.1:9").fetch("a.md").await.unwrap_err();
        assert!(matches!(err, DocsError::Network(_)));
    }
}
