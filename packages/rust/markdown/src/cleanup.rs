//! Tree passes applied between parsing and HTML output.
//!
//! Each pass walks the tree in place. [`run_pipeline`] applies the enabled ones
//! in a fixed order: heading ids, heading self-links, code highlighting, then
//! the stray-backtick cleanup which always runs.

use std::sync::LazyLock;

use regex::Regex;

use nizam_docs_shared::Result;

use crate::RenderOptions;
use crate::highlight;
use crate::slug::Slugger;
use crate::tree::{Element, ElementKind, Node};

/// Run the enabled passes over `root`.
pub(crate) fn run_pipeline(root: &mut Element, opts: &RenderOptions) -> Result<()> {
    if opts.heading_ids {
        assign_heading_ids(root, &mut Slugger::new());
    }
    if opts.heading_links {
        wrap_heading_links(root);
    }
    if opts.highlight {
        highlight_code_blocks(root)?;
    }
    scrub_backticks(root, false);
    Ok(())
}

fn child_elements(el: &mut Element) -> impl Iterator<Item = &mut Element> {
    el.children.iter_mut().filter_map(|n| match n {
        Node::Element(e) => Some(e),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Pass 1: Heading ids
// ---------------------------------------------------------------------------

/// Give every heading without an id a unique slug of its text.
fn assign_heading_ids(el: &mut Element, slugger: &mut Slugger) {
    if let ElementKind::Heading { id, .. } = &el.kind {
        if id.is_none() {
            let slug = slugger.slug(&el.text_content());
            if !slug.is_empty() {
                if let ElementKind::Heading { id, .. } = &mut el.kind {
                    *id = Some(slug);
                }
            }
        }
        return;
    }

    for child in child_elements(el) {
        assign_heading_ids(child, slugger);
    }
}

// ---------------------------------------------------------------------------
// Pass 2: Heading self-links
// ---------------------------------------------------------------------------

/// Wrap the content of every heading that has an id in a link to itself.
fn wrap_heading_links(el: &mut Element) {
    if let ElementKind::Heading { id: Some(id), .. } = &el.kind {
        let href = format!("#{id}");
        let content = std::mem::take(&mut el.children);
        el.children.push(Node::Element(Element::with_children(
            ElementKind::Link {
                href,
                title: String::new(),
                self_link: true,
            },
            content,
        )));
        return;
    }

    for child in child_elements(el) {
        wrap_heading_links(child);
    }
}

// ---------------------------------------------------------------------------
// Pass 3: Syntax highlighting
// ---------------------------------------------------------------------------

/// Replace the text of code blocks in a known language with highlighted markup.
fn highlight_code_blocks(el: &mut Element) -> Result<()> {
    if let ElementKind::CodeBlock { lang, .. } = &el.kind {
        let markup = match lang {
            Some(lang) => highlight::highlight(&el.text_content(), lang)?,
            None => None,
        };
        if let Some(markup) = markup {
            el.children = vec![Node::Markup(markup)];
            if let ElementKind::CodeBlock { highlighted, .. } = &mut el.kind {
                *highlighted = true;
            }
        }
        return Ok(());
    }

    for child in child_elements(el) {
        highlight_code_blocks(child)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pass 4: Stray backticks
// ---------------------------------------------------------------------------

/// Remove backticks that survived parsing.
///
/// Inline code loses all of its backticks. Plain text loses the backticks of
/// any `` `span` `` the parser did not turn into code. Code blocks are untouched.
fn scrub_backticks(el: &mut Element, in_inline_code: bool) {
    if matches!(el.kind, ElementKind::CodeBlock { .. }) {
        return;
    }
    let inline_code = in_inline_code || el.kind == ElementKind::InlineCode;

    for child in el.children.iter_mut() {
        match child {
            Node::Text(text) if inline_code => *text = scrub_inline_code(text),
            Node::Text(text) => {
                if text.contains('`') {
                    *text = scrub_text_run(text);
                }
            }
            Node::Element(inner) => scrub_backticks(inner, inline_code),
            Node::RawHtml(_) | Node::Markup(_) => {}
        }
    }
}

fn scrub_inline_code(text: &str) -> String {
    text.trim_matches('`').replace('`', "")
}

fn scrub_text_run(text: &str) -> String {
    static SPAN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"`([^`\s][^`]*?[^`\s]?)`").expect("valid regex"));

    SPAN_RE.replace_all(text, "$1").into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
