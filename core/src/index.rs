use crate::tokenizer::TokenizerConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type TermId = u32;
pub type DocId = u32;

/// One successfully fetched and parsed in-scope page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Absolute, canonical URL; unique key of the document.
    pub url: String,
    pub title: String,
    /// Visible text with whitespace runs collapsed.
    pub body: String,
    /// Outbound links in document order, duplicates included.
    #[serde(default)]
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Title,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub field: Field,
    /// Occurrences of the term inside `field` of the document.
    pub tf: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub tokenizer: TokenizerConfig,
    pub dictionary: HashMap<String, TermId>,
    /// Indexed by `TermId`; each list is sorted by `(doc_id, field)`.
    pub postings: Vec<Vec<Posting>>,
    /// Indexed by `DocId`, in URL order.
    pub docs: Vec<Document>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn num_docs(&self) -> usize { self.docs.len() }

    pub fn num_terms(&self) -> usize { self.dictionary.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    pub fn postings_for(&self, term: &str) -> &[Posting] {
        self.dictionary
            .get(term)
            .and_then(|tid| self.postings.get(*tid as usize))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn doc(&self, doc_id: DocId) -> Option<&Document> {
        self.docs.get(doc_id as usize)
    }
}
