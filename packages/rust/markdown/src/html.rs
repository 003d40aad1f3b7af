//! HTML writer for the document tree.
//!
//! Styled elements take their tag and classes from [`present`]; everything
//! else is written as plain semantic HTML.

use std::fmt::Write as _;

use crate::presentation::{LinkKind, Presentation, Role, present};
use crate::tree::{Align, Element, ElementKind, Node};

const SELF_LINK_CLASS: &str = "anchor-link";
const SELF_LINK_LABEL: &str = "Link to this section";

/// Write `root` and its descendants as HTML.
pub(crate) fn write_html(root: &Element, allow_raw_html: bool) -> String {
    let mut writer = HtmlWriter {
        out: String::with_capacity(4096),
        allow_raw_html,
    };
    writer.children(&root.children);
    writer.out
}

struct HtmlWriter {
    out: String,
    allow_raw_html: bool,
}

impl HtmlWriter {
    fn children(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.node(node);
        }
    }

    fn node(&mut self, node: &Node) {
        match node {
            Node::Element(el) => self.element(el),
            Node::Text(text) => self.out.push_str(&escape_text(text)),
            Node::RawHtml(html) if self.allow_raw_html => self.out.push_str(html),
            Node::RawHtml(html) => self.out.push_str(&escape_text(html)),
            Node::Markup(markup) => self.out.push_str(markup),
        }
    }

    fn element(&mut self, el: &Element) {
        match &el.kind {
            ElementKind::Root | ElementKind::Group => self.children(&el.children),
            ElementKind::Heading { level, id } => {
                let p = present(Role::Heading(*level));
                self.open(&p, id.as_deref().map(|id| ("id", id)).as_slice());
                self.children(&el.children);
                self.close(&p);
                self.out.push('\n');
            }
            ElementKind::Paragraph => self.styled(Role::Paragraph, el, true),
            ElementKind::BlockQuote => self.styled(Role::Blockquote, el, true),
            ElementKind::CodeBlock { lang, highlighted } => {
                self.code_block(el, lang.as_deref(), *highlighted)
            }
            ElementKind::InlineCode => self.styled(Role::InlineCode, el, false),
            ElementKind::List { start } => {
                let (role, start_attr) = match start {
                    Some(n) if *n != 1 => (Role::OrderedList, Some(n.to_string())),
                    Some(_) => (Role::OrderedList, None),
                    None => (Role::UnorderedList, None),
                };
                let p = present(role);
                match &start_attr {
                    Some(n) => self.open(&p, &[("start", n.as_str())]),
                    None => self.open(&p, &[]),
                }
                self.out.push('\n');
                self.children(&el.children);
                self.close(&p);
                self.out.push('\n');
            }
            ElementKind::ListItem => self.styled(Role::ListItem, el, true),
            ElementKind::TaskMarker { checked } => {
                self.out.push_str("<input type=\"checkbox\" disabled=\"\"");
                if *checked {
                    self.out.push_str(" checked=\"\"");
                }
                self.out.push_str(" /> ");
            }
            ElementKind::Table => self.table(el),
            ElementKind::TableHead => {
                self.out.push_str("<thead><tr>");
                self.children(&el.children);
                self.out.push_str("</tr></thead>\n");
            }
            ElementKind::TableRow => {
                self.out.push_str("<tr>");
                self.children(&el.children);
                self.out.push_str("</tr>\n");
            }
            ElementKind::TableCell { header, align } => {
                let p = present(if *header {
                    Role::HeaderCell
                } else {
                    Role::DataCell
                });
                match align_style(*align) {
                    Some(style) => self.open(&p, &[("style", style)]),
                    None => self.open(&p, &[]),
                }
                self.children(&el.children);
                self.close(&p);
            }
            ElementKind::Emphasis => self.plain("em", el),
            ElementKind::Strong => self.plain("strong", el),
            ElementKind::Strikethrough => self.plain("del", el),
            ElementKind::Link {
                href,
                title,
                self_link,
            } => self.link(el, href, title, *self_link),
            ElementKind::Image { src, title } => {
                let _ = write!(
                    self.out,
                    "<img src=\"{}\" alt=\"{}\"",
                    escape_attr(src),
                    escape_attr(&el.text_content())
                );
                if !title.is_empty() {
                    let _ = write!(self.out, " title=\"{}\"", escape_attr(title));
                }
                self.out.push_str(" />");
            }
            ElementKind::FootnoteReference { label } => {
                let label = escape_attr(label);
                let _ = write!(
                    self.out,
                    "<sup class=\"footnote-reference\"><a href=\"#fn-{label}\">{label}</a></sup>"
                );
            }
            ElementKind::FootnoteDefinition { label } => {
                let label = escape_attr(label);
                let _ = write!(
                    self.out,
                    "<div class=\"footnote-definition\" id=\"fn-{label}\"><sup class=\"footnote-definition-label\">{label}</sup>"
                );
                self.children(&el.children);
                self.out.push_str("</div>\n");
            }
            ElementKind::Rule => self.out.push_str("<hr />\n"),
            ElementKind::SoftBreak => self.out.push('\n'),
            ElementKind::HardBreak => self.out.push_str("<br />\n"),
        }
    }

    fn code_block(&mut self, el: &Element, lang: Option<&str>, highlighted: bool) {
        let pre = present(Role::Preformatted);
        let code = present(Role::BlockCode);

        let mut class = String::new();
        if highlighted {
            class.push_str("hljs ");
        }
        if let Some(lang) = lang {
            let _ = write!(class, "language-{} ", escape_attr(lang));
        }
        class.push_str(code.class);

        self.open(&pre, &[]);
        let _ = write!(self.out, "<{} class=\"{class}\">", code.tag);
        self.children(&el.children);
        self.close(&code);
        self.close(&pre);
        self.out.push('\n');
    }

    fn table(&mut self, el: &Element) {
        let p = present(Role::Table);
        if let Some((tag, class)) = p.wrapper {
            let _ = write!(self.out, "<{tag} class=\"{class}\">");
        }
        self.open(&p, &[]);
        self.out.push('\n');

        let mut body_open = false;
        for child in &el.children {
            let is_row =
                matches!(child, Node::Element(row) if row.kind == ElementKind::TableRow);
            if is_row && !body_open {
                self.out.push_str("<tbody>\n");
                body_open = true;
            }
            self.node(child);
        }
        if body_open {
            self.out.push_str("</tbody>\n");
        }

        self.close(&p);
        if let Some((tag, _)) = p.wrapper {
            let _ = write!(self.out, "</{tag}>");
        }
        self.out.push('\n');
    }

    fn link(&mut self, el: &Element, href: &str, title: &str, self_link: bool) {
        let kind = LinkKind::classify(href);
        let p = present(Role::Link(kind));
        let class = if self_link { SELF_LINK_CLASS } else { p.class };

        let _ = write!(
            self.out,
            "<{} href=\"{}\" class=\"{class}\"",
            p.tag,
            escape_attr(href)
        );
        if !title.is_empty() {
            let _ = write!(self.out, " title=\"{}\"", escape_attr(title));
        }
        for (name, value) in p.attrs {
            let _ = write!(self.out, " {name}=\"{value}\"");
        }
        if self_link {
            let _ = write!(self.out, " aria-label=\"{SELF_LINK_LABEL}\"");
        }
        if kind == LinkKind::Anchor {
            self.out.push_str(" data-anchor=\"\"");
        }
        self.out.push('>');
        self.children(&el.children);
        self.close(&p);
    }

    fn styled(&mut self, role: Role, el: &Element, block: bool) {
        let p = present(role);
        self.open(&p, &[]);
        self.children(&el.children);
        self.close(&p);
        if block {
            self.out.push('\n');
        }
    }

    fn plain(&mut self, tag: &str, el: &Element) {
        let _ = write!(self.out, "<{tag}>");
        self.children(&el.children);
        let _ = write!(self.out, "</{tag}>");
    }

    fn open(&mut self, p: &Presentation, extra: &[(&str, &str)]) {
        let _ = write!(self.out, "<{}", p.tag);
        for (name, value) in extra {
            let _ = write!(self.out, " {name}=\"{}\"", escape_attr(value));
        }
        let _ = write!(self.out, " class=\"{}\"", p.class);
        for (name, value) in p.attrs {
            let _ = write!(self.out, " {name}=\"{value}\"");
        }
        self.out.push('>');
    }

    fn close(&mut self, p: &Presentation) {
        let _ = write!(self.out, "</{}>", p.tag);
    }
}

fn align_style(align: Align) -> Option<&'static str> {
    match align {
        Align::None => None,
        Align::Left => Some("text-align: left"),
        Align::Center => Some("text-align: center"),
        Align::Right => Some("text-align: right"),
    }
}

/// Escape text content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for use inside double quotes.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
