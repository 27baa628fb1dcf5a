//! Bulk construction of an [`InvertedIndex`] from crawled documents.

use crate::index::{DocId, Document, Field, InvertedIndex, Posting, TermId};
use crate::tokenizer::{tokenize_with, TokenizerConfig};
use crate::{IndexError, Result};
use std::collections::BTreeMap;

/// Build an index with the default tokenizer.
pub fn build_index<I>(documents: I) -> Result<InvertedIndex>
where
    I: IntoIterator<Item = Document>,
{
    build_index_with(documents, TokenizerConfig::default())
}

/// Build an index from documents keyed by URL.
///
/// Documents are ordered by URL and terms by first appearance in that order,
/// so the same input always yields the same ids. A later duplicate URL replaces an earlier one.
pub fn build_index_with<I>(documents: I, tokenizer: TokenizerConfig) -> Result<InvertedIndex>
where
    I: IntoIterator<Item = Document>,
{
    let by_url: BTreeMap<String, Document> = documents.into_iter().map(|d| (d.url.clone(), d)).collect();
    if by_url.len() > DocId::MAX as usize {
        return Err(IndexError::Capacity { what: "documents", limit: DocId::MAX });
    }

    let mut index = InvertedIndex { tokenizer, ..InvertedIndex::default() };
    let mut next_term_id: TermId = 0;

    for (doc_id, doc) in by_url.into_values().enumerate() {
        let doc_id = doc_id as DocId;
        for (field, text) in [(Field::Title, &doc.title), (Field::Body, &doc.body)] {
            for (term, tf) in term_frequencies(text, &tokenizer) {
                let tid = match index.dictionary.get(&term) {
                    Some(&tid) => tid,
                    None => {
                        if next_term_id == TermId::MAX {
                            return Err(IndexError::Capacity { what: "terms", limit: TermId::MAX });
                        }
                        let tid = next_term_id;
                        next_term_id += 1;
                        index.dictionary.insert(term, tid);
                        index.postings.push(Vec::new());
                        tid
                    }
                };
                index.postings[tid as usize].push(Posting { doc_id, field, tf });
            }
        }
        tracing::debug!(doc_id, url = %doc.url, title = %doc.title, body_len = doc.body.len(), "indexed document");
        index.docs.push(doc);
    }

    tracing::info!(num_docs = index.num_docs(), num_terms = index.num_terms(), "index build complete");
    Ok(index)
}

fn term_frequencies(text: &str, tokenizer: &TokenizerConfig) -> BTreeMap<String, u32> {
    let mut tf: BTreeMap<String, u32> = BTreeMap::new();
    for term in tokenize_with(text, tokenizer) {
        *tf.entry(term).or_insert(0) += 1;
    }
    tf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(url: &str, title: &str, body: &str) -> Document {
        Document { url: url.into(), title: title.into(), body: body.into(), links: vec![] }
    }

    #[test]
    fn records_per_field_frequencies() {
        let index = build_index(vec![doc("/a", "Platypus Facts", "platypus platypus eggs")]).unwrap();
        let postings = index.postings_for("platypus");
        assert_eq!(postings.len(), 2);
        assert!(postings.contains(&Posting { doc_id: 0, field: Field::Title, tf: 1 }));
        assert!(postings.contains(&Posting { doc_id: 0, field: Field::Body, tf: 2 }));
        assert!(index.postings_for("fact").iter().all(|p| p.field == Field::Title));
    }

    #[test]
    fn doc_ids_follow_url_order() {
        let index = build_index(vec![doc("/b", "", "b"), doc("/a", "", "a")]).unwrap();
        assert_eq!(index.doc(0).map(|d| d.url.as_str()), Some("/a"));
        assert_eq!(index.doc(1).map(|d| d.url.as_str()), Some("/b"));
    }

    #[test]
    fn postings_are_sorted_by_doc() {
        let docs = (0..5).map(|i| doc(&format!("/{i}"), "rust", "rust"));
        let index = build_index(docs).unwrap();
        let ids: Vec<DocId> = index.postings_for("rust").iter().map(|p| p.doc_id).collect();
        assert_eq!(ids, vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[test]
    fn empty_input_builds_empty_index() {
        let index = build_index(Vec::new()).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.num_terms(), 0);
    }
}
