//! Polite, bounded, same-site crawler.
//!
//! [`Crawler::crawl`] walks the link graph depth-first from a start URL,
//! fetching every in-scope page at most once and turning each HTML page
//! into a [`Document`]. Per-URL failures are logged and skipped; they
//! never abort the crawl.

pub mod fetcher;
pub mod parser;
pub mod scope;
pub mod state;

use fetcher::{FetchError, Fetcher};
use parser::parse_page;
use scope::{canonicalize, Scope, DEFAULT_DENIED_EXTENSIONS};
use sitesearch_core::Document;
use state::{CrawlState, Frontier};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinSet;
use url::Url;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub user_agent: String,
    /// Per-request timeout, covering connect through body.
    pub timeout: Duration,
    pub max_redirects: usize,
    /// Number of pages fetched at once. `1` gives strict depth-first order.
    pub concurrency: usize,
    /// Stop scheduling new fetches after this many URLs were claimed.
    pub max_pages: Option<usize>,
    pub denied_extensions: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("sitesearch-bot/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(5),
            max_redirects: 5,
            concurrency: 1,
            max_pages: None,
            denied_extensions: DEFAULT_DENIED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlStats {
    pub fetched: usize,
    pub failed: usize,
    /// Fetched but rejected: non-HTML, or redirected out of scope.
    pub skipped: usize,
}

#[derive(Debug, Default)]
pub struct CrawlOutput {
    /// Every fetched and parsed page, keyed by canonical URL.
    pub documents: BTreeMap<String, Document>,
    pub stats: CrawlStats,
}

impl CrawlOutput {
    pub fn into_documents(self) -> BTreeMap<String, Document> { self.documents }
}

enum PageOutcome {
    Indexed { links: Vec<Url> },
    Failed(FetchError),
}

pub struct Crawler {
    config: CrawlConfig,
    fetcher: Fetcher,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        let fetcher = Fetcher::new(&config)?;
        Ok(Self { config, fetcher })
    }

    pub fn config(&self) -> &CrawlConfig { &self.config }

    /// Crawl everything reachable from `start` within its site.
    ///
    /// An unparsable or out-of-scope start URL yields an empty output.
    pub async fn crawl(&self, start: &str) -> CrawlOutput {
        let started = Instant::now();
        let Some((start, scope)) = Url::parse(start)
            .ok()
            .map(|u| canonicalize(&u))
            .and_then(|u| Scope::for_start(&u, &self.config.denied_extensions).map(|s| (u, s)))
        else {
            tracing::warn!(start, "start URL is not crawlable, nothing to do");
            return CrawlOutput::default();
        };

        tracing::info!(%start, concurrency = self.config.concurrency, max_pages = ?self.config.max_pages, "crawl started");
        let state = Arc::new(CrawlState::default());
        let mut stats = CrawlStats::default();
        let fetcher = self.fetcher.within(scope.clone());
        // LIFO worklist: popping from the end gives depth-first order.
        let mut frontier = Frontier::default();
        frontier.push(start);
        let mut inflight: JoinSet<(Url, PageOutcome)> = JoinSet::new();
        let concurrency = self.config.concurrency.max(1);

        loop {
            while inflight.len() < concurrency {
                if self.config.max_pages.is_some_and(|max| state.visited_count() >= max) {
                    if !frontier.is_empty() {
                        tracing::info!(pending = frontier.len(), "page limit reached");
                        frontier.clear();
                    }
                    break;
                }
                let Some(url) = frontier.pop() else { break };
                if !state.try_visit(url.as_str()) { continue; }

                let fetcher = fetcher.clone();
                let state = state.clone();
                inflight.spawn(async move {
                    let outcome = process_page(&fetcher, &state, &url).await;
                    (url, outcome)
                });
            }

            let Some(joined) = inflight.join_next().await else { break };
            let (url, outcome) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::error!(error = %e, "crawl worker panicked");
                    stats.failed += 1;
                    continue;
                }
            };

            match outcome {
                PageOutcome::Indexed { links } => {
                    stats.fetched += 1;
                    // Reverse so the page's first link is popped next.
                    for link in links.into_iter().rev() {
                        let link = canonicalize(&link);
                        if scope.contains(&link) && !state.is_visited(link.as_str()) {
                            frontier.push(link);
                        }
                    }
                }
                PageOutcome::Failed(
                    e @ (FetchError::UnsupportedContentType { .. } | FetchError::OffSiteRedirect { .. }),
                ) => {
                    stats.skipped += 1;
                    tracing::info!(%url, reason = %e, "skipped");
                }
                PageOutcome::Failed(e) => {
                    stats.failed += 1;
                    tracing::warn!(%url, error = %e, "fetch failed");
                }
            }

            if (stats.fetched + stats.failed + stats.skipped) % 100 == 0 {
                tracing::info!(
                    fetched = stats.fetched,
                    visited = state.visited_count(),
                    frontier = frontier.len(),
                    "progress"
                );
            }
        }

        let documents = Arc::try_unwrap(state)
            .map(CrawlState::into_documents)
            .unwrap_or_else(|shared| shared.documents());
        tracing::info!(
            documents = documents.len(),
            fetched = stats.fetched,
            failed = stats.failed,
            skipped = stats.skipped,
            elapsed_s = started.elapsed().as_secs_f64(),
            "crawl finished"
        );
        CrawlOutput { documents, stats }
    }
}

async fn process_page(fetcher: &Fetcher, state: &CrawlState, url: &Url) -> PageOutcome {
    tracing::debug!(%url, "fetching");
    let page = match fetcher.fetch(url).await {
        Ok(page) => page,
        Err(e) => return PageOutcome::Failed(e),
    };

    let parsed = parse_page(&page.body, &page.final_url);
    if parsed.lossy {
        tracing::warn!(%url, "page is not valid UTF-8, decoded lossily");
    } else if parsed.parse_errors > 0 {
        tracing::debug!(%url, errors = parsed.parse_errors, "recovered from malformed HTML");
    }
    tracing::debug!(%url, title = %parsed.title, text_len = parsed.body.len(), links = parsed.links.len(), "parsed");

    let links = parsed.links;
    state.insert_document(Document {
        url: url.to_string(),
        title: parsed.title,
        body: parsed.body,
        links: links.iter().map(Url::to_string).collect(),
    });
    PageOutcome::Indexed { links }
}
