//! Front-matter extraction.
//!
//! A front-matter block is a YAML mapping fenced by `---` lines at the very
//! start of the file. Only `title`, `order` and `category` are read; other
//! keys are ignored. A missing, unterminated or malformed block never fails:
//! it degrades to empty metadata.

use serde_yaml::{Mapping, Value};
use tracing::debug;

/// Metadata recognised in a front-matter block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub order: Option<i64>,
    pub category: Option<String>,
}

impl FrontMatter {
    /// True when no recognised key was present.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.order.is_none() && self.category.is_none()
    }
}

/// Split `raw` into its metadata and the remaining body.
///
/// Text without a block is returned unchanged with empty metadata. When a
/// block is present the body starts on the line after the closing `---`.
pub fn extract(raw: &str) -> (FrontMatter, &str) {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    match split_block(text) {
        Some((yaml, body)) => (parse_metadata(yaml), body),
        None => (FrontMatter::default(), raw),
    }
}

/// Locate the fenced block. Returns `(yaml, body)`.
fn split_block(text: &str) -> Option<(&str, &str)> {
    let first_end = text.find('\n')?;
    if text[..first_end].trim_end() != "---" {
        return None;
    }

    let rest = &text[first_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    // Unterminated: not a front-matter block.
    None
}

fn parse_metadata(yaml: &str) -> FrontMatter {
    let value: Value = match serde_yaml::from_str(yaml) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "malformed front matter, ignoring");
            return FrontMatter::default();
        }
    };

    let Value::Mapping(map) = value else {
        return FrontMatter::default();
    };

    FrontMatter {
        title: string_field(&map, "title"),
        order: integer_field(&map, "order"),
        category: string_field(&map, "category"),
    }
}

fn string_field(map: &Mapping, key: &str) -> Option<String> {
    let text = match map.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn integer_field(map: &Mapping, key: &str) -> Option<i64> {
    match map.get(key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
