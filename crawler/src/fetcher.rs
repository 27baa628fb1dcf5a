//! Single-shot HTTP GET with timeout and content-type validation.
//!
//! Redirects are followed by hand so every hop can be checked against the
//! crawl [`Scope`] before a request is sent to it.

use crate::scope::Scope;
use crate::CrawlConfig;
use reqwest::{header, redirect::Policy, Client, StatusCode, Url};
use thiserror::Error;

/// Why a URL produced no page. None of these abort a crawl.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("unsupported content type {content_type:?} for {url}")]
    UnsupportedContentType { url: String, content_type: String },

    #[error("{url} redirects out of scope to {location}")]
    OffSiteRedirect { url: String, location: String },

    #[error("more than {limit} redirects starting at {url}")]
    TooManyRedirects { url: String, limit: usize },
}

#[derive(Debug)]
pub struct FetchedPage {
    /// URL after redirects; relative links resolve against it.
    pub final_url: Url,
    pub content_type: String,
    pub body: Vec<u8>,
}

#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    max_redirects: usize,
    /// When set, a redirect to a URL outside it is never requested.
    scope: Option<Scope>,
}

impl Fetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, max_redirects: config.max_redirects, scope: None })
    }

    /// Same client, but redirects may only lead to URLs inside `scope`.
    pub fn within(&self, scope: Scope) -> Self {
        Self { scope: Some(scope), ..self.clone() }
    }

    /// GET `url`, following up to `max_redirects` redirects. Only a final
    /// 200 response with an HTML media type succeeds.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let network = |source| FetchError::Network { url: url.to_string(), source };

        let mut current = url.clone();
        let mut hops = 0;
        let resp = loop {
            let resp = self.client.get(current.clone()).send().await.map_err(network)?;
            if !resp.status().is_redirection() {
                break resp;
            }
            let Some(next) = redirect_target(&current, resp.headers()) else {
                break resp;
            };
            if hops == self.max_redirects {
                return Err(FetchError::TooManyRedirects { url: url.to_string(), limit: self.max_redirects });
            }
            if self.scope.as_ref().is_some_and(|scope| !scope.contains(&next)) {
                return Err(FetchError::OffSiteRedirect { url: url.to_string(), location: next.to_string() });
            }
            tracing::debug!(from = %current, to = %next, "following redirect");
            current = next;
            hops += 1;
        };

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchError::Http { url: url.to_string(), status: status.as_u16() });
        }

        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_html(&content_type) {
            return Err(FetchError::UnsupportedContentType { url: url.to_string(), content_type });
        }

        let final_url = current;
        let body = resp.bytes().await.map_err(network)?.to_vec();
        Ok(FetchedPage { final_url, content_type, body })
    }
}

/// Resolve a `Location` header against the URL that returned it.
fn redirect_target(from: &Url, headers: &header::HeaderMap) -> Option<Url> {
    let location = headers.get(header::LOCATION)?.to_str().ok()?;
    from.join(location).ok()
}

/// True for `text/html` and `application/xhtml+xml`, ignoring parameters.
pub fn is_html(content_type: &str) -> bool {
    let media_type = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    matches!(media_type.as_str(), "text/html" | "application/xhtml+xml")
}
