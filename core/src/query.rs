//! Ranked free-text search over an [`InvertedIndex`].
//!
//! Scoring is a weighted term-frequency sum: for every query term and every
//! posting of that term, a document gains `field_weight * tf`. Terms are
//! OR-combined, so a document matching any term is a candidate, and one
//! matching more terms generally accumulates a higher score.

use crate::index::{DocId, Field, InvertedIndex};
use crate::tokenizer::tokenize_with;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const TITLE_WEIGHT: f32 = 2.0;
pub const BODY_WEIGHT: f32 = 1.0;
pub const DEFAULT_LIMIT: usize = 10;
pub const SNIPPET_CHARS: usize = 200;

/// URL carried by the "no results" sentinel; never a real document URL.
pub const NO_RESULTS_URL: &str = "#";
pub const NO_RESULTS_TITLE: &str = "No Results Found";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub url: String,
    pub score: f32,
    pub title: String,
    pub snippet: String,
}

impl ScoredResult {
    /// The placeholder returned when nothing matched `query`.
    pub fn no_results(query: &str) -> Self {
        Self {
            url: NO_RESULTS_URL.to_string(),
            score: 0.0,
            title: NO_RESULTS_TITLE.to_string(),
            snippet: format!(
                "Sorry, no documents were found containing \"{query}\". Try different search terms."
            ),
        }
    }

    pub fn is_sentinel(&self) -> bool { self.url == NO_RESULTS_URL }
}

pub fn field_weight(field: Field) -> f32 {
    match field {
        Field::Title => TITLE_WEIGHT,
        Field::Body => BODY_WEIGHT,
    }
}

/// Search `index` for `query`, returning at most `limit` results ordered by
/// descending score, ties broken by URL. When nothing scores above zero
/// (including an empty or punctuation-only query) the single
/// [`ScoredResult::no_results`] sentinel is returned instead.
pub fn search(index: &InvertedIndex, query: &str, limit: usize) -> Vec<ScoredResult> {
    if limit == 0 {
        return Vec::new();
    }

    let scored = score_documents(index, query);
    tracing::debug!(query, hits = scored.len(), "search");
    if scored.is_empty() {
        return vec![ScoredResult::no_results(query)];
    }

    scored
        .into_iter()
        .take(limit)
        .filter_map(|(doc_id, score)| {
            let doc = index.doc(doc_id)?;
            let title = if doc.title.is_empty() { doc.url.clone() } else { doc.title.clone() };
            Some(ScoredResult { url: doc.url.clone(), score, title, snippet: snippet(&doc.body) })
        })
        .collect()
}

/// Every document with a positive score, best first.
pub fn score_documents(index: &InvertedIndex, query: &str) -> Vec<(DocId, f32)> {
    let mut scores: HashMap<DocId, f32> = HashMap::new();
    for term in tokenize_with(query, &index.tokenizer) {
        for p in index.postings_for(&term) {
            *scores.entry(p.doc_id).or_insert(0.0) += field_weight(p.field) * p.tf as f32;
        }
    }

    let mut scored: Vec<(DocId, f32)> = scores.into_iter().filter(|(_, s)| *s > 0.0).collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| url_of(index, a.0).cmp(url_of(index, b.0)))
    });
    scored
}

fn url_of(index: &InvertedIndex, doc_id: DocId) -> &str {
    index.doc(doc_id).map(|d| d.url.as_str()).unwrap_or("")
}

/// First [`SNIPPET_CHARS`] characters of `body` followed by `...`.
/// The marker is appended to every real hit, short bodies included.
pub fn snippet(body: &str) -> String {
    let cut = body.char_indices().nth(SNIPPET_CHARS).map_or(body.len(), |(i, _)| i);
    format!("{}...", &body[..cut])
}
