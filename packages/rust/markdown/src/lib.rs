//! Markdown processing for the documentation site.
//!
//! Front-matter extraction and document normalization turn fetched text into
//! catalog [`Document`]s. [`render`] turns Markdown into styled HTML: the text
//! is parsed into a tree, the transform passes run over it, and the writer
//! emits HTML using the presentation table in [`presentation`].

mod cleanup;
pub mod frontmatter;
mod highlight;
mod html;
pub mod normalize;
pub mod presentation;
pub mod slug;
pub mod tree;

use tracing::{debug, instrument};

use nizam_docs_shared::{Document, Result};

pub use frontmatter::{FrontMatter, extract as extract_front_matter};
pub use highlight::CLASS_PREFIX as HIGHLIGHT_CLASS_PREFIX;
pub use html::{escape_attr, escape_text};
pub use normalize::{normalize_document, normalize_entry, slugify_path};
pub use presentation::{LinkKind, Presentation, Role, present};
pub use slug::{Slugger, slugify};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Switches for the rendering pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Tables, strikethrough, task lists, footnotes and bare-URL links.
    pub gfm: bool,
    /// Give headings slug ids.
    pub heading_ids: bool,
    /// Wrap heading text in a link to the heading. Needs `heading_ids`.
    pub heading_links: bool,
    /// Syntax-highlight fenced code in known languages.
    pub highlight: bool,
    /// Pass HTML embedded in the Markdown through unescaped.
    pub allow_raw_html: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            heading_ids: true,
            heading_links: true,
            highlight: true,
            allow_raw_html: false,
        }
    }
}

/// A heading that can be scrolled to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingAnchor {
    pub level: u8,
    pub id: String,
    pub text: String,
}

/// Output of [`render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    /// Headings that received an id, in document order.
    pub headings: Vec<HeadingAnchor>,
}

impl Rendered {
    /// Whether an element with `id` exists among the rendered headings.
    pub fn has_heading(&self, id: &str) -> bool {
        self.headings.iter().any(|h| h.id == id)
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render Markdown to HTML.
#[instrument(skip(markdown), fields(len = markdown.len()))]
pub fn render(markdown: &str, opts: &RenderOptions) -> Result<Rendered> {
    let mut root = tree::parse(markdown, opts.gfm);
    cleanup::run_pipeline(&mut root, opts)?;

    let mut headings = Vec::new();
    collect_headings(&root, &mut headings);

    let html = html::write_html(&root, opts.allow_raw_html);
    debug!(html_len = html.len(), headings = headings.len(), "rendered");

    Ok(Rendered { html, headings })
}

/// Render a catalog document's content.
pub fn render_document(doc: &Document, opts: &RenderOptions) -> Result<Rendered> {
    render(&doc.content, opts)
}

fn collect_headings(el: &tree::Element, out: &mut Vec<HeadingAnchor>) {
    if let tree::ElementKind::Heading {
        level,
        id: Some(id),
    } = &el.kind
    {
        out.push(HeadingAnchor {
            level: *level,
            id: id.clone(),
            text: el.text_content(),
        });
        return;
    }
    for child in &el.children {
        if let tree::Node::Element(inner) = child {
            collect_headings(inner, out);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> RenderOptions {
        RenderOptions {
            highlight: false,
            ..RenderOptions::default()
        }
    }

    #[test]
    fn heading_gets_id_and_self_link() {
        let out = render("## Install\n\nRun it.", &plain()).unwrap();
        assert!(out.html.starts_with("<h2 id=\"install\" class=\""));
        assert!(out.html.contains(
            "<a href=\"#install\" class=\"anchor-link\" aria-label=\"Link to this section\" data-anchor=\"\">Install</a></h2>"
        ));
        assert_eq!(
            out.headings,
            vec![HeadingAnchor {
                level: 2,
                id: "install".into(),
                text: "Install".into()
            }]
        );
        assert!(out.has_heading("install"));
        assert!(!out.has_heading("usage"));
    }

    #[test]
    fn heading_links_can_be_disabled() {
        let opts = RenderOptions {
            heading_links: false,
            ..plain()
        };
        let out = render("## Install", &opts).unwrap();
        assert!(out.html.contains("<h2 id=\"install\""));
        assert!(!out.html.contains("anchor-link"));
    }

    #[test]
    fn without_ids_no_headings_are_reported() {
        let opts = RenderOptions {
            heading_ids: false,
            ..plain()
        };
        let out = render("## Install", &opts).unwrap();
        assert!(out.headings.is_empty());
        assert!(!out.html.contains("id="));
    }

    #[test]
    fn inline_code_backticks_are_cleaned() {
        let out = render("Set `` `value` `` here.", &plain()).unwrap();
        assert!(out.html.contains(">value</code>"));
        assert!(!out.html.contains('`'));
    }

    #[test]
    fn inline_and_block_code_are_styled_differently() {
        let out = render("Use `nizam up`.\n\n```\nnizam up\n```", &plain()).unwrap();
        assert!(out.html.contains("<code class=\"bg-gray-700/50"));
        assert!(out.html.contains("<code class=\"text-sm font-mono\">nizam up\n</code>"));
    }

    #[test]
    fn highlighted_code_carries_classes() {
        let out = render("```rust\nfn main() {}\n```", &RenderOptions::default()).unwrap();
        assert!(out.html.contains("<code class=\"hljs language-rust text-sm font-mono\">"));
        assert!(out.html.contains(&format!("class=\"{HIGHLIGHT_CLASS_PREFIX}")));
    }

    #[test]
    fn tables_render_with_gfm_only() {
        let md = "| Service | Port |\n|---|---|\n| postgres | 5432 |";
        let out = render(md, &plain()).unwrap();
        assert!(out.html.contains("<th class=\"px-6 py-4 bg-gray-800/50"));
        assert!(out.html.contains(">5432</td>"));

        let off = RenderOptions { gfm: false, ..plain() };
        assert!(!render(md, &off).unwrap().html.contains("<table"));
    }

    #[test]
    fn external_links_open_new_context() {
        let out = render("See https://github.com/abdultolba/nizam", &plain()).unwrap();
        assert!(out.html.contains(
            "href=\"https://github.com/abdultolba/nizam\" class=\"text-primary"
        ));
        assert!(out.html.contains("target=\"_blank\" rel=\"noopener noreferrer\""));
    }

    #[test]
    fn text_is_escaped() {
        let out = render("a <b> & c", &plain()).unwrap();
        assert!(out.html.contains("&lt;b&gt; &amp; c"));
    }

    #[test]
    fn renders_document_content() {
        let doc = Document {
            slug: "b".into(),
            title: "Hello".into(),
            content: "Body".into(),
            order: 999,
            category: "General".into(),
        };
        let out = render_document(&doc, &plain()).unwrap();
        assert_eq!(out.html, "<p class=\"text-gray-300 leading-relaxed mb-5\">Body</p>\n");
    }
}
