//! Structural-to-presentational mapping.
//!
//! [`present`] is a pure lookup from the kind of element being written to the
//! tag and attributes it is written with. The HTML writer consults it for
//! every element it styles, so the look of rendered docs can be tested here
//! without rendering anything.

/// How a link target is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `#fragment`: scrolls within the page.
    Anchor,
    /// Points at another host: opens in a new browsing context.
    External,
    /// Everything else: navigates normally.
    Internal,
}

impl LinkKind {
    /// Classify an `href`.
    pub fn classify(href: &str) -> Self {
        let href = href.trim();
        if href.starts_with('#') {
            Self::Anchor
        } else if href.starts_with("http://")
            || href.starts_with("https://")
            || href.starts_with("//")
        {
            Self::External
        } else {
            Self::Internal
        }
    }
}

/// Element kinds that carry presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Heading(u8),
    Paragraph,
    InlineCode,
    /// The `<pre>` around a code block.
    Preformatted,
    /// The `<code>` inside a code block.
    BlockCode,
    Blockquote,
    Table,
    HeaderCell,
    DataCell,
    UnorderedList,
    OrderedList,
    ListItem,
    Link(LinkKind),
}

/// Tag, class and fixed attributes for one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub tag: &'static str,
    pub class: &'static str,
    /// Extra attributes written verbatim after `class`.
    pub attrs: &'static [(&'static str, &'static str)],
    /// Element wrapped around this one (tag, class).
    pub wrapper: Option<(&'static str, &'static str)>,
}

impl Presentation {
    const fn new(tag: &'static str, class: &'static str) -> Self {
        Self {
            tag,
            class,
            attrs: &[],
            wrapper: None,
        }
    }
}

/// Tags for heading levels 1-6.
const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Look up the presentation for `role`.
pub fn present(role: Role) -> Presentation {
    match role {
        Role::Heading(1) => Presentation::new(
            "h1",
            "text-4xl font-bold text-white mb-6 pb-3 border-b-2 border-primary/30 scroll-mt-32",
        ),
        Role::Heading(2) => Presentation::new(
            "h2",
            "text-3xl font-semibold text-gray-100 mt-12 mb-6 pb-2 border-b border-gray-700 scroll-mt-32",
        ),
        Role::Heading(3) => Presentation::new(
            "h3",
            "text-2xl font-semibold text-gray-200 mt-8 mb-4 scroll-mt-32",
        ),
        Role::Heading(4) => Presentation::new(
            "h4",
            "text-xl font-semibold text-gray-300 mt-6 mb-3 scroll-mt-32",
        ),
        Role::Heading(level) => {
            let index = usize::from(level.clamp(1, 6)) - 1;
            Presentation::new(HEADING_TAGS[index], "scroll-mt-32")
        }
        Role::Paragraph => Presentation::new("p", "text-gray-300 leading-relaxed mb-5"),
        Role::InlineCode => Presentation::new(
            "code",
            "bg-gray-700/50 text-primary px-2 py-1 rounded text-sm font-mono border border-gray-600/30",
        ),
        Role::Preformatted => Presentation::new(
            "pre",
            "bg-gray-900/80 backdrop-blur text-gray-100 p-6 rounded-xl overflow-x-auto mb-6 text-sm border border-gray-700/50",
        ),
        Role::BlockCode => Presentation::new("code", "text-sm font-mono"),
        Role::Blockquote => Presentation::new(
            "blockquote",
            "border-l-4 border-primary/60 pl-6 py-3 my-6 bg-gray-800/30 text-gray-300 italic rounded-r-lg",
        ),
        Role::Table => Presentation {
            wrapper: Some((
                "div",
                "overflow-x-auto mb-6 rounded-lg border border-gray-700/50",
            )),
            ..Presentation::new("table", "min-w-full divide-y divide-gray-700")
        },
        Role::HeaderCell => Presentation::new(
            "th",
            "px-6 py-4 bg-gray-800/50 text-left text-sm font-semibold text-primary uppercase tracking-wider",
        ),
        Role::DataCell => Presentation::new(
            "td",
            "px-6 py-4 text-sm text-gray-300 border-b border-gray-700/50",
        ),
        Role::UnorderedList => Presentation::new(
            "ul",
            "list-disc list-outside ml-6 mb-5 space-y-2 text-gray-300",
        ),
        Role::OrderedList => Presentation::new(
            "ol",
            "list-decimal list-outside ml-6 mb-5 space-y-2 text-gray-300",
        ),
        Role::ListItem => Presentation::new("li", "mb-1 leading-relaxed"),
        Role::Link(LinkKind::Anchor) => Presentation::new(
            "a",
            "text-primary hover:text-primary/80 no-underline hover:underline transition-colors duration-200 font-medium",
        ),
        Role::Link(LinkKind::External) => Presentation {
            attrs: &[("target", "_blank"), ("rel", "noopener noreferrer")],
            ..Presentation::new(
                "a",
                "text-primary hover:text-primary/80 underline hover:no-underline transition-colors duration-200 font-medium",
            )
        },
        Role::Link(LinkKind::Internal) => Presentation::new(
            "a",
            "text-primary hover:text-primary/80 underline hover:no-underline transition-colors duration-200 font-medium",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_links() {
        assert_eq!(LinkKind::classify("#install"), LinkKind::Anchor);
        assert_eq!(LinkKind::classify("https://github.com/abdultolba/nizam"), LinkKind::External);
        assert_eq!(LinkKind::classify("http://localhost:8080"), LinkKind::External);
        assert_eq!(LinkKind::classify("//cdn.example.com/x.js"), LinkKind::External);
        assert_eq!(LinkKind::classify("docs/COMMANDS.md"), LinkKind::Internal);
        assert_eq!(LinkKind::classify("/docs/cli"), LinkKind::Internal);
        assert_eq!(LinkKind::classify("mailto:team@example.com"), LinkKind::Internal);
    }

    #[test]
    fn headings_one_to_four_are_styled() {
        for level in 1..=4u8 {
            let p = present(Role::Heading(level));
            assert_eq!(p.tag, format!("h{level}"));
            assert!(p.class.contains("scroll-mt-32"));
            assert!(p.class.contains("font-"));
        }
    }

    #[test]
    fn deeper_headings_keep_their_tag() {
        assert_eq!(present(Role::Heading(5)).tag, "h5");
        assert_eq!(present(Role::Heading(6)).tag, "h6");
        assert_eq!(present(Role::Heading(6)).class, "scroll-mt-32");
    }

    #[test]
    fn tables_are_wrapped_for_scrolling() {
        let p = present(Role::Table);
        assert_eq!(p.tag, "table");
        assert_eq!(p.wrapper.map(|(tag, _)| tag), Some("div"));
        assert!(p.wrapper.unwrap().1.contains("overflow-x-auto"));
    }

    #[test]
    fn only_external_links_open_new_context() {
        let external = present(Role::Link(LinkKind::External));
        assert!(external.attrs.contains(&("target", "_blank")));
        assert!(external.attrs.contains(&("rel", "noopener noreferrer")));

        assert!(present(Role::Link(LinkKind::Anchor)).attrs.is_empty());
        assert!(present(Role::Link(LinkKind::Internal)).attrs.is_empty());
        assert!(present(Role::Link(LinkKind::Anchor)).class.contains("no-underline"));
    }

    #[test]
    fn inline_and_block_code_differ() {
        assert_ne!(present(Role::InlineCode).class, present(Role::BlockCode).class);
        assert_eq!(present(Role::Preformatted).tag, "pre");
    }
}
