//! HTML pages for the browser-facing search UI.

use sitesearch_core::ScoredResult;

const STYLE: &str = r#"
    body { font-family: Arial, sans-serif; margin: 40px; }
    .search-form { margin-bottom: 20px; }
    .search-input { padding: 10px; width: 300px; }
    .search-button { padding: 10px 20px; }
    .result { margin-bottom: 20px; }
    .result-title { color: #1a0dab; }
    .result-url { color: #006621; }
    .result-preview { color: #545454; }
    .result-preview em { font-weight: bold; font-style: normal; }
    .no-results { color: #666; padding: 20px 0; }
"#;

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

fn page(title: &str, query: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
    <head>
        <title>{title}</title>
        <style>{STYLE}</style>
    </head>
    <body>
        <h1>Search Engine</h1>
        <form class="search-form" action="/search" method="get">
            <input type="text" name="q" value="{query}" class="search-input" placeholder="Enter search terms..." required>
            <button type="submit" class="search-button">Search</button>
        </form>
        {content}
    </body>
</html>
"#,
        title = escape_html(title),
        query = escape_html(query),
    )
}

pub fn home(num_docs: usize) -> String {
    let status = if num_docs == 0 {
        "The index is empty: the crawl found no pages.".to_string()
    } else {
        format!("Search engine ready! {num_docs} pages indexed.")
    };
    page("Search Engine", "", &format!(r#"<div id="status">{}</div>"#, escape_html(&status)))
}

pub fn results(query: &str, results: &[ScoredResult]) -> String {
    let mut content = String::from(r#"<div class="results">"#);
    for r in results {
        if r.is_sentinel() {
            content.push_str(&format!(
                r#"
            <div class="no-results">
                <h2>{}</h2>
                <p>{}</p>
                <p>Try different or fewer search terms.</p>
            </div>"#,
                escape_html(&r.title),
                escape_html(&r.snippet),
            ));
        } else {
            let url = escape_html(&r.url);
            content.push_str(&format!(
                r#"
            <div class="result">
                <div class="result-title"><a href="{url}">{}</a></div>
                <div class="result-url">{url}</div>
                <div class="result-preview">{}</div>
            </div>"#,
                escape_html(&r.title),
                highlight_terms(&r.snippet, query),
            ));
        }
    }
    content.push_str("\n        </div>");
    page("Search Results", query, &content)
}

/// Escape `raw` and wrap case-insensitive occurrences of the query's words
/// in `<em>`. Matching runs once over the unescaped text, so words never
/// match inside entities or previously inserted tags.
fn highlight_terms(raw: &str, query: &str) -> String {
    let mut words: Vec<&str> = query.split_whitespace().collect();
    if words.is_empty() {
        return escape_html(raw);
    }
    // Longest first, so a word wins over its own prefix.
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));
    let alternation = words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|");
    let Ok(pat) = regex::RegexBuilder::new(&alternation).case_insensitive(true).build() else {
        return escape_html(raw);
    };

    let mut out = String::with_capacity(raw.len() + 16);
    let mut last = 0;
    for m in pat.find_iter(raw) {
        out.push_str(&escape_html(&raw[last..m.start()]));
        out.push_str("<em>");
        out.push_str(&escape_html(m.as_str()));
        out.push_str("</em>");
        last = m.end();
    }
    out.push_str(&escape_html(&raw[last..]));
    out
}
