//! Class-based syntax highlighting for fenced code blocks.

use std::sync::LazyLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use nizam_docs_shared::{DocsError, Result};

/// Prefix put on every scope class so stylesheets can target them.
pub const CLASS_PREFIX: &str = "hljs-";

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Highlight `code` written in `lang`.
///
/// Returns `Ok(None)` when the language is unknown; the caller then escapes the
/// code verbatim.
pub fn highlight(code: &str, lang: &str) -> Result<Option<String>> {
    let Some(syntax) = SYNTAXES.find_syntax_by_token(lang) else {
        return Ok(None);
    };

    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        &SYNTAXES,
        ClassStyle::SpacedPrefixed {
            prefix: CLASS_PREFIX,
        },
    );

    for line in LinesWithEndings::from(code) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|e| DocsError::render(format!("highlighting {lang} failed: {e}")))?;
    }

    Ok(Some(generator.finalize()))
}
