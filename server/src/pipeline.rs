//! Crawl, build and publish one index generation.

use sitesearch_core::persist::{save_index, IndexPaths};
use sitesearch_core::tokenizer::TokenizerConfig;
use sitesearch_core::{builder::build_index_with, IndexError, IndexHandle, InvertedIndex};
use sitesearch_crawler::{CrawlStats, Crawler};
use serde::Serialize;
use std::path::PathBuf;

pub struct Pipeline {
    crawler: Crawler,
    start_url: String,
    index_dir: Option<PathBuf>,
    tokenizer: TokenizerConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub num_docs: usize,
    pub num_terms: usize,
    pub fetched: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BuildReport {
    fn new(index: &InvertedIndex, stats: CrawlStats) -> Self {
        Self {
            num_docs: index.num_docs(),
            num_terms: index.num_terms(),
            fetched: stats.fetched,
            failed: stats.failed,
            skipped: stats.skipped,
        }
    }
}

impl Pipeline {
    pub fn new(crawler: Crawler, start_url: impl Into<String>) -> Self {
        Self { crawler, start_url: start_url.into(), index_dir: None, tokenizer: TokenizerConfig::default() }
    }

    /// Also write every generation to `dir`, replacing the previous one.
    pub fn with_index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.index_dir = Some(dir.into());
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: TokenizerConfig) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn start_url(&self) -> &str { &self.start_url }

    /// Crawl the site and build a fresh index from it.
    ///
    /// An empty crawl yields an empty index; only building or persisting
    /// the index can fail.
    pub async fn build(&self) -> Result<(InvertedIndex, BuildReport), IndexError> {
        let output = self.crawler.crawl(&self.start_url).await;
        if output.documents.is_empty() {
            tracing::warn!(start_url = %self.start_url, "crawl found no documents; serving an empty index");
        }
        let stats = output.stats;
        let index = build_index_with(output.into_documents().into_values(), self.tokenizer)?;
        if let Some(dir) = &self.index_dir {
            save_index(&IndexPaths::new(dir), &index)?;
        }
        let report = BuildReport::new(&index, stats);
        Ok((index, report))
    }

    /// Build a new generation and swap it into `handle`. On failure the
    /// handle keeps serving the previous index.
    pub async fn rebuild(&self, handle: &IndexHandle) -> Result<BuildReport, IndexError> {
        let (index, report) = self.build().await?;
        handle.swap(index);
        Ok(report)
    }
}
