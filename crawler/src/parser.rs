//! Best-effort HTML extraction: title, visible text and outbound links.
//!
//! html5ever recovers from any input, so parsing never fails; problems are
//! reported through [`ParsedPage::degraded`] instead.

use lazy_static::lazy_static;
use scraper::{Html, Node, Selector};
use url::Url;

lazy_static! {
    static ref TITLE: Selector = Selector::parse("title").expect("valid selector");
    static ref ANCHOR: Selector = Selector::parse("a[href]").expect("valid selector");
}

/// Elements whose text is never shown to a reader.
const HIDDEN: &[&str] = &["head", "script", "style", "noscript", "template"];

#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// First `<title>` text, whitespace-collapsed; empty when absent.
    pub title: String,
    /// Visible text with whitespace runs collapsed to single spaces.
    pub body: String,
    /// Every `<a href>` resolved against the base URL, in document order.
    pub links: Vec<Url>,
    /// Bytes were not valid UTF-8 and were decoded lossily.
    pub lossy: bool,
    /// Number of recoverable HTML syntax errors.
    pub parse_errors: usize,
}

impl ParsedPage {
    pub fn degraded(&self) -> bool { self.lossy || self.parse_errors > 0 }
}

pub fn parse_page(raw: &[u8], base: &Url) -> ParsedPage {
    let text = String::from_utf8_lossy(raw);
    let lossy = matches!(text, std::borrow::Cow::Owned(_));
    let document = Html::parse_document(&text);

    let title = document
        .select(&TITLE)
        .next()
        .map(|n| collapse_whitespace(&n.text().collect::<String>()))
        .unwrap_or_default();

    let links = document
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href.trim()).ok())
        .collect();

    ParsedPage { title, body: visible_text(&document), links, lossy, parse_errors: document.errors.len() }
}

fn visible_text(document: &Html) -> String {
    let mut out = String::new();
    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else { continue };
        let hidden = node.ancestors().any(|a| {
            a.value().as_element().is_some_and(|e| HIDDEN.contains(&e.name()))
        });
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    collapse_whitespace(&out)
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/dir/page.html").unwrap()
    }

    fn parse(html: &str) -> ParsedPage {
        parse_page(html.as_bytes(), &base_url())
    }

    #[test]
    fn extracts_title() {
        let parsed = parse("<html><head><title>  Test\n  Page  </title></head><body></body></html>");
        assert_eq!(parsed.title, "Test Page");
    }

    #[test]
    fn missing_title_is_empty() {
        assert_eq!(parse("<html><body>hi</body></html>").title, "");
    }

    #[test]
    fn body_text_is_collapsed_and_visible_only() {
        let parsed = parse(
            "<html><head><title>T</title><style>p { color: red }</style></head>\
             <body>\n  <h1>Hello</h1>\n\n<p>big   wide\tworld</p>\
             <script>var hidden = 1;</script><noscript>enable js</noscript></body></html>",
        );
        assert_eq!(parsed.body, "Hello big wide world");
    }

    #[test]
    fn resolves_links_in_order_with_duplicates() {
        let parsed = parse(
            r#"<body><a href="/a">A</a><a href="b.html">B</a><a href="https://other.com/x">X</a><a href="/a">A again</a></body>"#,
        );
        let links: Vec<String> = parsed.links.iter().map(Url::to_string).collect();
        assert_eq!(
            links,
            vec![
                "https://example.com/a",
                "https://example.com/dir/b.html",
                "https://other.com/x",
                "https://example.com/a",
            ]
        );
    }

    #[test]
    fn anchors_without_href_are_ignored() {
        assert!(parse(r#"<body><a name="top">top</a></body>"#).links.is_empty());
    }

    #[test]
    fn malformed_html_degrades_gracefully() {
        let parsed = parse("<html><body><p>unclosed <b>bold <a href='/x'>link</div></p>");
        assert_eq!(parsed.body, "unclosed bold link");
        assert_eq!(parsed.links.len(), 1);
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let parsed = parse_page(b"<title>caf\xe9</title><body>ok</body>", &base_url());
        assert!(parsed.lossy);
        assert!(parsed.degraded());
        assert_eq!(parsed.body, "ok");
    }

    #[test]
    fn empty_input_yields_empty_page() {
        let parsed = parse_page(b"", &base_url());
        assert_eq!(parsed.title, "");
        assert_eq!(parsed.body, "");
        assert!(parsed.links.is_empty());
    }
}
