//! Document normalization: slug derivation and title resolution.
//!
//! Title precedence is manifest override > front-matter title > first
//! top-level heading in the body > file name without extension. When the
//! heading wins and it opens the body, it is lifted out of the content so the
//! title is not shown twice.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use nizam_docs_shared::{
    DEFAULT_CATEGORY, DEFAULT_ORDER, DocsError, Document, ManifestEntry, Result,
};

use crate::frontmatter::{self, FrontMatter};

/// Extensions stripped from paths before slugging.
const MARKDOWN_EXTENSIONS: [&str; 2] = [".md", ".markdown"];

/// Derive the catalog slug from a source path.
///
/// Strips a trailing Markdown extension, turns every path separator into `-`
/// and lowercases. Pure: the same path always yields the same slug.
pub fn slugify_path(path: &str) -> String {
    strip_markdown_extension(path.trim())
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Normalize a standalone file, taking order and category from its front matter.
#[instrument(skip(raw))]
pub fn normalize_document(path: &str, raw: &str) -> Result<Document> {
    let (meta, body) = frontmatter::extract(raw);
    let order = meta.order.unwrap_or(DEFAULT_ORDER);
    let category = meta
        .category
        .clone()
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    build(path, &meta, body, None, order, category)
}

/// Normalize a manifest entry's fetched text. Manifest values win over
/// anything declared in the file.
#[instrument(skip(raw), fields(path = %entry.path))]
pub fn normalize_entry(entry: &ManifestEntry, raw: &str) -> Result<Document> {
    let (meta, body) = frontmatter::extract(raw);

    build(
        &entry.path,
        &meta,
        body,
        entry.title.as_deref(),
        entry.order,
        entry.category.clone(),
    )
}

fn build(
    path: &str,
    meta: &FrontMatter,
    body: &str,
    title_override: Option<&str>,
    order: i64,
    category: String,
) -> Result<Document> {
    let slug = slugify_path(path);
    if slug.is_empty() {
        return Err(DocsError::validation(format!(
            "path '{path}' does not produce a slug"
        )));
    }

    let (title, content) = resolve_title(meta, body, path, title_override);
    debug!(%slug, %title, "normalized");

    Ok(Document {
        slug,
        title,
        content,
        order,
        category,
    })
}

/// Pick the display title and the content to store alongside it.
fn resolve_title(
    meta: &FrontMatter,
    body: &str,
    path: &str,
    title_override: Option<&str>,
) -> (String, String) {
    let explicit = title_override
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .or_else(|| meta.title.clone());

    if let Some(title) = explicit {
        return (title, body.to_string());
    }

    if let Some(heading) = first_heading(body) {
        let content = if heading.leading {
            lift_heading(body, heading.line_end)
        } else {
            body.to_string()
        };
        return (heading.text, content);
    }

    (file_stem(path), body.to_string())
}

/// A top-level heading found in a body.
#[derive(Debug, PartialEq, Eq)]
struct Heading {
    text: String,
    /// Byte offset just past the heading line (including its newline).
    line_end: usize,
    /// Whether only blank lines precede the heading.
    leading: bool,
}

/// Find the first `# Title` line outside fenced code.
fn first_heading(body: &str) -> Option<Heading> {
    static H1_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^ {0,3}#[ \t]+(.+)$").expect("valid regex"));

    let mut fence: Option<(char, usize)> = None;
    let mut leading = true;
    let mut offset = 0;

    for line in body.split_inclusive('\n') {
        offset += line.len();
        let trimmed = line.trim_end();

        if let Some((ch, len, rest)) = fence_marker(trimmed) {
            fence = match fence {
                None => Some((ch, len)),
                Some((open, open_len)) if ch == open && len >= open_len && rest.is_empty() => None,
                still_open => still_open,
            };
            leading = false;
            continue;
        }
        if fence.is_some() {
            continue;
        }

        if let Some(caps) = H1_RE.captures(trimmed) {
            let text = strip_closing_hashes(&caps[1]);
            if !text.is_empty() {
                return Some(Heading {
                    text: text.to_string(),
                    line_end: offset,
                    leading,
                });
            }
        }

        if !trimmed.is_empty() {
            leading = false;
        }
    }

    None
}

/// A run of three or more backticks or tildes opening `line`, with its
/// character, length and whatever follows it.
fn fence_marker(line: &str) -> Option<(char, usize, &str)> {
    let line = line.trim_start();
    let ch = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = line.len() - line.trim_start_matches(ch).len();
    (len >= 3).then(|| (ch, len, line[len..].trim()))
}

/// Drop an ATX closing sequence (`# Title ##` → `Title`).
fn strip_closing_hashes(text: &str) -> &str {
    let text = text.trim();
    let without = text.trim_end_matches('#');
    if without.len() < text.len() && (without.is_empty() || without.ends_with([' ', '\t'])) {
        without.trim_end()
    } else {
        text
    }
}

/// Remove everything up to `line_end` plus any blank lines that follow.
fn lift_heading(body: &str, line_end: usize) -> String {
    let rest = &body[line_end..];
    let mut skip = 0;
    for line in rest.split_inclusive('\n') {
        if !line.trim().is_empty() {
            break;
        }
        skip += line.len();
    }
    rest[skip..].to_string()
}

/// File name without directories or Markdown extension.
fn file_stem(path: &str) -> String {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    strip_markdown_extension(name).to_string()
}

fn strip_markdown_extension(path: &str) -> &str {
    for ext in MARKDOWN_EXTENSIONS {
        if path.len() >= ext.len() {
            let split = path.len() - ext.len();
            if path.is_char_boundary(split) && path[split..].eq_ignore_ascii_case(ext) {
                return &path[..split];
            }
        }
    }
    path
}
