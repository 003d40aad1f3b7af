//! Live documentation view and the site-wide context it renders into.

use tracing::{debug, info, instrument, warn};

use nizam_docs_fetcher::{DocumentSource, FetchOptions, FetchOutcome, HttpSource};
use nizam_docs_markdown::{RenderOptions, Rendered, escape_text, extract_front_matter, render};
use nizam_docs_shared::{DocsError, Result, SiteConfig, Theme};

use crate::navigator::{AnchorNavigator, ScrollRequest};

/// Message shown when the document host answers with anything but success.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load documentation";

// ---------------------------------------------------------------------------
// SiteContext
// ---------------------------------------------------------------------------

/// Application-wide settings fixed once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteContext {
    theme: Theme,
}

impl SiteContext {
    /// Build the context from config. This is the only place the theme is set.
    pub fn initialize(config: &SiteConfig) -> Self {
        info!(theme = config.theme.root_class(), "site context initialized");
        Self {
            theme: config.theme,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Wrap page content in the themed root element.
    pub fn page(&self, body: &str) -> String {
        format!(
            "<div class=\"{} min-h-screen\">\n{body}</div>\n",
            self.theme.root_class()
        )
    }
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// What the documentation view currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Loaded(Rendered),
    Failed(String),
}

impl ViewState {
    /// Markup for the content area.
    pub fn to_html(&self) -> String {
        match self {
            Self::Loading => concat!(
                "<div class=\"min-h-screen flex items-center justify-center\">",
                "<div class=\"text-center\">",
                "<div class=\"animate-spin rounded-full h-12 w-12 border-b-2 border-primary mx-auto mb-4\"></div>",
                "<p class=\"text-gray-400\">Loading documentation...</p>",
                "</div></div>\n"
            )
            .to_string(),
            Self::Failed(message) => format!(
                concat!(
                    "<div class=\"min-h-screen flex items-center justify-center\">",
                    "<div class=\"text-center\">",
                    "<h2 class=\"text-xl font-semibold text-red-400 mb-2\">Error Loading Documentation</h2>",
                    "<p class=\"text-gray-400\">{}</p>",
                    "</div></div>\n"
                ),
                escape_text(message)
            ),
            Self::Loaded(rendered) => format!(
                concat!(
                    "<div class=\"bg-gray-800/50 backdrop-blur-sm rounded-2xl shadow-2xl border border-gray-700/50 p-8\">",
                    "<article class=\"prose prose-invert prose-lg max-w-none\">\n",
                    "{}",
                    "</article></div>\n"
                ),
                rendered.html
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// DocumentView
// ---------------------------------------------------------------------------

/// One document displayed in full, plus its anchor navigation.
#[derive(Debug)]
pub struct DocumentView {
    state: ViewState,
    navigator: AnchorNavigator,
}

impl DocumentView {
    /// A view in the loading state for a location with `fragment`.
    pub fn new(fragment: Option<&str>) -> Self {
        Self {
            state: ViewState::Loading,
            navigator: AnchorNavigator::new(fragment),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn navigator(&self) -> &AnchorNavigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut AnchorNavigator {
        &mut self.navigator
    }

    /// Fetch and render `path`. Any failure moves the view to
    /// [`ViewState::Failed`]. On success the navigator is told the content is
    /// ready and its scroll decision is returned.
    #[instrument(skip(self, source, opts))]
    pub async fn load<S: DocumentSource>(
        &mut self,
        source: &S,
        path: &str,
        opts: &RenderOptions,
    ) -> Option<ScrollRequest> {
        self.state = ViewState::Loading;

        match fetch_and_render(source, path, opts).await {
            Ok(rendered) => {
                let scroll = self.navigator.content_ready(&rendered.html);
                self.state = ViewState::Loaded(rendered);
                scroll
            }
            Err(e) => {
                warn!(path, error = %e, "documentation view failed to load");
                self.state = ViewState::Failed(failure_message(&e));
                None
            }
        }
    }

    /// The full page for the current state.
    pub fn to_page(&self, site: &SiteContext) -> String {
        site.page(&self.state.to_html())
    }
}

/// Load the configured overview document from the site.
pub async fn load_overview(
    site: &SiteConfig,
    fetch: &FetchOptions,
    opts: &RenderOptions,
    fragment: Option<&str>,
) -> Result<(DocumentView, Option<ScrollRequest>)> {
    let url = site.overview_url()?;
    let (dir, doc) = split_document_url(url.as_str())?;
    let source = HttpSource::new(dir, fetch)?;
    debug!(base = source.base(), doc, "loading overview");

    let mut view = DocumentView::new(fragment);
    let scroll = view.load(&source, doc, opts).await;
    Ok((view, scroll))
}

/// Split a resolved document URL into its directory and file name.
fn split_document_url(url: &str) -> Result<(&str, &str)> {
    match url.rsplit_once('/') {
        Some((dir, doc)) if !doc.is_empty() && !dir.ends_with('/') => Ok((dir, doc)),
        _ => Err(DocsError::config(format!(
            "overview URL '{url}' does not name a document"
        ))),
    }
}

async fn fetch_and_render<S: DocumentSource>(
    source: &S,
    path: &str,
    opts: &RenderOptions,
) -> Result<Rendered> {
    let raw = match source.fetch(path).await? {
        FetchOutcome::Found(raw) => raw,
        FetchOutcome::NotFound => {
            return Err(DocsError::Status {
                url: source.locate(path),
                status: 404,
            });
        }
    };

    let (_, body) = extract_front_matter(&raw);
    render(body, opts)
}

fn failure_message(err: &DocsError) -> String {
    match err {
        DocsError::Status { .. } => LOAD_FAILED_MESSAGE.to_string(),
        other => other.to_string(),
    }
}
