use url::Url;

/// Suffixes of binary resources that are never fetched.
pub const DEFAULT_DENIED_EXTENSIONS: &[&str] = &["pdf", "jpg", "png", "gif"];

/// Which URLs a crawl may fetch: same host and port as the start URL,
/// http(s) only, path not ending in a denied extension.
#[derive(Debug, Clone)]
pub struct Scope {
    host: String,
    port: Option<u16>,
    denied_suffixes: Vec<String>,
}

impl Scope {
    /// Scope anchored at `start`, or `None` if `start` itself is out of scope.
    pub fn for_start<S: AsRef<str>>(start: &Url, denied_extensions: &[S]) -> Option<Self> {
        let scope = Self {
            host: start.host_str()?.to_string(),
            port: start.port_or_known_default(),
            denied_suffixes: denied_extensions.iter().map(|e| format!(".{}", e.as_ref())).collect(),
        };
        scope.contains(start).then_some(scope)
    }

    pub fn contains(&self, url: &Url) -> bool {
        matches!(url.scheme(), "http" | "https")
            && url.host_str() == Some(self.host.as_str())
            && url.port_or_known_default() == self.port
            && !self.denied_suffixes.iter().any(|s| url.path().ends_with(s.as_str()))
    }
}

/// Canonical key for a URL: the fragment never selects a different page.
pub fn canonicalize(url: &Url) -> Url {
    let mut u = url.clone();
    u.set_fragment(None);
    u
}
