//! In-page anchor navigation.
//!
//! The navigator owns the current fragment and an index of the element ids on
//! the displayed page. It never touches a real page: every decision comes back
//! as a [`ScrollRequest`] or [`LinkAction`] for the display layer to carry out.
//! Content arriving late is handled by [`AnchorNavigator::content_ready`]
//! instead of a timer.

use std::collections::HashSet;

use percent_encoding::percent_decode_str;
use scraper::{Html, Selector};
use tracing::debug;

use nizam_docs_markdown::LinkKind;

/// How the scroll animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
}

/// Where the target lands in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Start,
}

/// Scroll the element with `target_id` into view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub target_id: String,
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

impl ScrollRequest {
    fn to(target_id: &str) -> Self {
        Self {
            target_id: target_id.to_string(),
            behavior: ScrollBehavior::Smooth,
            block: ScrollBlock::Start,
        }
    }
}

/// What to do when a link is activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// Scroll in place and push `history_fragment` without navigating.
    ScrollTo {
        request: ScrollRequest,
        history_fragment: String,
    },
    /// Anchor link whose target is not on the page: do nothing.
    Suppressed,
    /// Open in a new browsing context.
    OpenNewContext(String),
    /// Ordinary navigation.
    Navigate(String),
}

/// Ids present on a rendered page.
#[derive(Debug, Clone, Default)]
pub struct PageIndex {
    ids: HashSet<String>,
}

impl PageIndex {
    /// Collect every `id` attribute in an HTML fragment.
    pub fn from_html(html: &str) -> Self {
        let Ok(selector) = Selector::parse("[id]") else {
            return Self::default();
        };

        let fragment = Html::parse_fragment(html);
        let ids = fragment
            .select(&selector)
            .filter_map(|el| el.value().id())
            .map(String::from)
            .collect();
        Self { ids }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Decode a location fragment into an element id.
///
/// Accepts the fragment with or without its leading `#`. Percent-escapes are
/// decoded. Returns `None` for an empty fragment.
pub fn fragment_target(fragment: &str) -> Option<String> {
    let raw = fragment.strip_prefix('#').unwrap_or(fragment);
    if raw.is_empty() {
        return None;
    }
    let decoded = percent_decode_str(raw).decode_utf8_lossy().into_owned();
    (!decoded.is_empty()).then_some(decoded)
}

/// Tracks the fragment for one document view.
#[derive(Debug, Default)]
pub struct AnchorNavigator {
    fragment: Option<String>,
    page: Option<PageIndex>,
}

impl AnchorNavigator {
    /// Start with the fragment of the initial location, if any.
    pub fn new(fragment: Option<&str>) -> Self {
        Self {
            fragment: fragment.and_then(fragment_target),
            page: None,
        }
    }

    /// Current target id.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Whether content has been delivered.
    pub fn is_ready(&self) -> bool {
        self.page.is_some()
    }

    /// Content finished loading. Returns the scroll for the pending fragment,
    /// if its target exists.
    pub fn content_ready(&mut self, html: &str) -> Option<ScrollRequest> {
        let page = PageIndex::from_html(html);
        debug!(ids = page.len(), "content ready");
        self.page = Some(page);
        self.resolve()
    }

    /// The location fragment changed. Before content is ready the fragment is
    /// only remembered.
    pub fn fragment_changed(&mut self, fragment: Option<&str>) -> Option<ScrollRequest> {
        self.fragment = fragment.and_then(fragment_target);
        self.resolve()
    }

    /// Decide what activating a link to `href` does.
    pub fn follow_link(&mut self, href: &str) -> LinkAction {
        match LinkKind::classify(href) {
            LinkKind::External => LinkAction::OpenNewContext(href.to_string()),
            LinkKind::Internal => LinkAction::Navigate(href.to_string()),
            LinkKind::Anchor => {
                let Some(target) = fragment_target(href.trim()) else {
                    return LinkAction::Suppressed;
                };
                if !self.has_target(&target) {
                    debug!(%target, "anchor target not on page");
                    return LinkAction::Suppressed;
                }
                let request = ScrollRequest::to(&target);
                self.fragment = Some(target);
                LinkAction::ScrollTo {
                    request,
                    history_fragment: href.trim().to_string(),
                }
            }
        }
    }

    fn has_target(&self, id: &str) -> bool {
        self.page.as_ref().is_some_and(|page| page.contains(id))
    }

    fn resolve(&self) -> Option<ScrollRequest> {
        let target = self.fragment.as_deref()?;
        if self.has_target(target) {
            Some(ScrollRequest::to(target))
        } else {
            None
        }
    }
}
