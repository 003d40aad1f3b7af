//! Structured document tree built from `pulldown-cmark` events.
//!
//! The renderer never writes HTML straight from the event stream: events are
//! folded into a small tree first so the transform passes (heading ids,
//! self-links, highlighting, cleanup) can work on whole elements.

use std::sync::LazyLock;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// HTML that came from the Markdown source.
    RawHtml(String),
    /// Markup generated by a transform pass; written verbatim.
    Markup(String),
}

/// An element and its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub children: Vec<Node>,
}

/// Column alignment of a table cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// Structural element kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Root,
    /// Transparent container for constructs without their own markup.
    Group,
    Heading { level: u8, id: Option<String> },
    Paragraph,
    BlockQuote,
    CodeBlock { lang: Option<String>, highlighted: bool },
    InlineCode,
    List { start: Option<u64> },
    ListItem,
    TaskMarker { checked: bool },
    Table,
    TableHead,
    TableRow,
    TableCell { header: bool, align: Align },
    Emphasis,
    Strong,
    Strikethrough,
    Link { href: String, title: String, self_link: bool },
    Image { src: String, title: String },
    FootnoteReference { label: String },
    FootnoteDefinition { label: String },
    Rule,
    SoftBreak,
    HardBreak,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: ElementKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    /// Concatenated text of all descendants, inline code included.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Append a child, merging adjacent text runs.
    fn push(&mut self, node: Node) {
        if let Node::Text(text) = &node {
            if let Some(Node::Text(prev)) = self.children.last_mut() {
                prev.push_str(text);
                return;
            }
        }
        self.children.push(node);
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => collect_text(&el.children, out),
            Node::RawHtml(_) | Node::Markup(_) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse Markdown into a tree rooted at [`ElementKind::Root`].
///
/// With `gfm` set, tables, strikethrough, task lists, footnotes and literal
/// autolinks (bare URLs) are recognised.
pub fn parse(markdown: &str, gfm: bool) -> Element {
    let mut options = Options::empty();
    if gfm {
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
    }

    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(markdown, options) {
        builder.event(event);
    }

    let mut root = builder.finish();
    if gfm {
        autolink_literals(&mut root);
    }
    root
}

/// Folds the event stream into nested elements.
struct TreeBuilder {
    stack: Vec<Element>,
    alignments: Vec<Align>,
    in_table_head: bool,
    cell_index: usize,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Element::new(ElementKind::Root)],
            alignments: Vec::new(),
            in_table_head: false,
            cell_index: 0,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => {
                let kind = self.open(tag);
                self.stack.push(Element::new(kind));
            }
            Event::End(tag) => {
                if tag == TagEnd::TableHead {
                    self.in_table_head = false;
                }
                self.close();
            }
            Event::Text(text) => self.push(Node::Text(text.into_string())),
            Event::Code(code) => self.push(Node::Element(Element::with_children(
                ElementKind::InlineCode,
                vec![Node::Text(code.into_string())],
            ))),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push(Node::RawHtml(html.into_string()))
            }
            Event::SoftBreak => self.leaf(ElementKind::SoftBreak),
            Event::HardBreak => self.leaf(ElementKind::HardBreak),
            Event::Rule => self.leaf(ElementKind::Rule),
            Event::TaskListMarker(checked) => self.leaf(ElementKind::TaskMarker { checked }),
            Event::FootnoteReference(label) => self.leaf(ElementKind::FootnoteReference {
                label: label.into_string(),
            }),
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) -> ElementKind {
        match tag {
            Tag::Paragraph => ElementKind::Paragraph,
            Tag::Heading { level, id, .. } => ElementKind::Heading {
                level: level as u8,
                id: id.map(|s| s.into_string()),
            },
            Tag::BlockQuote(_) => ElementKind::BlockQuote,
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split(|c: char| c.is_whitespace() || c == ',' || c == '{')
                        .next()
                        .filter(|l| !l.is_empty())
                        .map(String::from),
                    CodeBlockKind::Indented => None,
                };
                ElementKind::CodeBlock {
                    lang,
                    highlighted: false,
                }
            }
            Tag::List(start) => ElementKind::List { start },
            Tag::Item => ElementKind::ListItem,
            Tag::FootnoteDefinition(label) => ElementKind::FootnoteDefinition {
                label: label.into_string(),
            },
            Tag::Table(alignments) => {
                self.alignments = alignments.into_iter().map(convert_alignment).collect();
                ElementKind::Table
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.cell_index = 0;
                ElementKind::TableHead
            }
            Tag::TableRow => {
                self.cell_index = 0;
                ElementKind::TableRow
            }
            Tag::TableCell => {
                let align = self
                    .alignments
                    .get(self.cell_index)
                    .copied()
                    .unwrap_or_default();
                self.cell_index += 1;
                ElementKind::TableCell {
                    header: self.in_table_head,
                    align,
                }
            }
            Tag::Emphasis => ElementKind::Emphasis,
            Tag::Strong => ElementKind::Strong,
            Tag::Strikethrough => ElementKind::Strikethrough,
            Tag::Link {
                dest_url, title, ..
            } => ElementKind::Link {
                href: dest_url.into_string(),
                title: title.into_string(),
                self_link: false,
            },
            Tag::Image {
                dest_url, title, ..
            } => ElementKind::Image {
                src: dest_url.into_string(),
                title: title.into_string(),
            },
            _ => ElementKind::Group,
        }
    }

    fn close(&mut self) {
        if self.stack.len() > 1 {
            if let Some(done) = self.stack.pop() {
                self.push(Node::Element(done));
            }
        }
    }

    fn leaf(&mut self, kind: ElementKind) {
        self.push(Node::Element(Element::new(kind)));
    }

    fn push(&mut self, node: Node) {
        if let Some(top) = self.stack.last_mut() {
            top.push(node);
        }
    }

    fn finish(mut self) -> Element {
        while self.stack.len() > 1 {
            self.close();
        }
        self.stack
            .pop()
            .unwrap_or_else(|| Element::new(ElementKind::Root))
    }
}

fn convert_alignment(alignment: Alignment) -> Align {
    match alignment {
        Alignment::None => Align::None,
        Alignment::Left => Align::Left,
        Alignment::Center => Align::Center,
        Alignment::Right => Align::Right,
    }
}

// ---------------------------------------------------------------------------
// Literal autolinks
// ---------------------------------------------------------------------------

/// Turn bare `http(s)://` and `www.` URLs in text into links.
fn autolink_literals(el: &mut Element) {
    match el.kind {
        ElementKind::Link { .. }
        | ElementKind::Image { .. }
        | ElementKind::InlineCode
        | ElementKind::CodeBlock { .. } => return,
        _ => {}
    }

    let children = std::mem::take(&mut el.children);
    for child in children {
        match child {
            Node::Text(text) => {
                for node in split_urls(&text) {
                    el.children.push(node);
                }
            }
            Node::Element(mut inner) => {
                autolink_literals(&mut inner);
                el.children.push(Node::Element(inner));
            }
            other => el.children.push(other),
        }
    }
}

fn split_urls(text: &str) -> Vec<Node> {
    static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?:https?://|www\.)[^\s<>]+").expect("valid regex")
    });

    let mut nodes = Vec::new();
    let mut last = 0;

    for m in URL_RE.find_iter(text) {
        if !starts_autolink(text[..m.start()].chars().next_back()) {
            continue;
        }
        let url = trim_url(m.as_str());
        if url.is_empty() || url.ends_with("://") || url == "www." {
            continue;
        }
        let end = m.start() + url.len();

        if m.start() > last {
            nodes.push(Node::Text(text[last..m.start()].to_string()));
        }
        let href = if url.starts_with("www.") {
            format!("http://{url}")
        } else {
            url.to_string()
        };
        nodes.push(Node::Element(Element::with_children(
            ElementKind::Link {
                href,
                title: String::new(),
                self_link: false,
            },
            vec![Node::Text(url.to_string())],
        )));
        last = end;
    }

    if last < text.len() {
        nodes.push(Node::Text(text[last..].to_string()));
    }
    nodes
}

/// A literal URL may only start at the beginning of a text run, after
/// whitespace, or after one of `*`, `_`, `~`, `(`.
fn starts_autolink(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, '*' | '_' | '~' | '('),
    }
}

/// Drop trailing punctuation and unbalanced closing parentheses.
fn trim_url(url: &str) -> &str {
    let mut url = url.trim_end_matches(['.', ',', ':', ';', '!', '?', '"', '\'', '*', '_', '~']);
    while url.ends_with(')') && url.matches(')').count() > url.matches('(').count() {
        url = &url[..url.len() - 1];
        url = url.trim_end_matches(['.', ',', ':', ';', '!', '?', '"', '\'', '*', '_', '~']);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_element(root: &Element) -> &Element {
        match &root.children[0] {
            Node::Element(el) => el,
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn builds_nested_structure() {
        let root = parse("# Title\n\nSome *emphasis* here.", true);
        assert_eq!(root.children.len(), 2);

        let heading = first_element(&root);
        assert_eq!(heading.kind, ElementKind::Heading { level: 1, id: None });
        assert_eq!(heading.text_content(), "Title");

        let Node::Element(para) = &root.children[1] else {
            panic!("expected paragraph");
        };
        assert_eq!(para.kind, ElementKind::Paragraph);
        assert!(
            para.children
                .iter()
                .any(|n| matches!(n, Node::Element(e) if e.kind == ElementKind::Emphasis))
        );
    }

    #[test]
    fn fenced_code_keeps_language() {
        let root = parse("```rust,ignore\nfn main() {}\n```", true);
        let block = first_element(&root);
        assert_eq!(
            block.kind,
            ElementKind::CodeBlock {
                lang: Some("rust".into()),
                highlighted: false
            }
        );
        assert_eq!(block.text_content(), "fn main() {}\n");
    }

    #[test]
    fn table_cells_know_header_and_alignment() {
        let root = parse("| a | b |\n|:--|--:|\n| 1 | 2 |", true);
        let table = first_element(&root);
        assert_eq!(table.kind, ElementKind::Table);

        let Node::Element(head) = &table.children[0] else {
            panic!("expected head");
        };
        let Node::Element(first_cell) = &head.children[0] else {
            panic!("expected cell");
        };
        assert_eq!(
            first_cell.kind,
            ElementKind::TableCell {
                header: true,
                align: Align::Left
            }
        );

        let Node::Element(row) = &table.children[1] else {
            panic!("expected row");
        };
        let Node::Element(second) = &row.children[1] else {
            panic!("expected cell");
        };
        assert_eq!(
            second.kind,
            ElementKind::TableCell {
                header: false,
                align: Align::Right
            }
        );
    }

    #[test]
    fn tables_need_gfm() {
        let root = parse("| a | b |\n|---|---|\n| 1 | 2 |", false);
        assert_eq!(first_element(&root).kind, ElementKind::Paragraph);
    }

    #[test]
    fn bare_urls_become_links() {
        let root = parse("See https://github.com/abdultolba/nizam. Or www.example.com", true);
        let para = first_element(&root);
        let links: Vec<&ElementKind> = para
            .children
            .iter()
            .filter_map(|n| match n {
                Node::Element(e) if matches!(e.kind, ElementKind::Link { .. }) => Some(&e.kind),
                _ => None,
            })
            .collect();

        assert_eq!(links.len(), 2);
        assert!(matches!(links[0], ElementKind::Link { href, .. } if href == "https://github.com/abdultolba/nizam"));
        assert!(matches!(links[1], ElementKind::Link { href, .. } if href == "http://www.example.com"));
    }

    #[test]
    fn urls_inside_words_are_not_linked() {
        let root = parse("awww.example.com and xhttps://example.com but (https://nizam.dev)", true);
        let para = first_element(&root);
        let hrefs: Vec<&str> = para
            .children
            .iter()
            .filter_map(|n| match n {
                Node::Element(Element {
                    kind: ElementKind::Link { href, .. },
                    ..
                }) => Some(href.as_str()),
                _ => None,
            })
            .collect();

        assert_eq!(hrefs, vec!["https://nizam.dev"]);
        assert!(para.text_content().starts_with("awww.example.com and xhttps://example.com"));
    }

    #[test]
    fn urls_in_code_are_left_alone() {
        let root = parse("`https://example.com`", true);
        let para = first_element(&root);
        let Node::Element(code) = &para.children[0] else {
            panic!("expected code");
        };
        assert_eq!(code.kind, ElementKind::InlineCode);
        assert_eq!(code.children, vec![Node::Text("https://example.com".into())]);
    }

    #[test]
    fn trim_url_balances_parentheses() {
        assert_eq!(trim_url("https://en.wikipedia.org/wiki/Rust_(language))."), "https://en.wikipedia.org/wiki/Rust_(language)");
        assert_eq!(trim_url("https://example.com/)"), "https://example.com/");
    }

    #[test]
    fn adjacent_text_is_merged() {
        let root = parse("a [b c", true);
        let para = first_element(&root);
        assert_eq!(para.children, vec![Node::Text("a [b c".into())]);
    }
}
