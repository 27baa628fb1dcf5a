use parking_lot::Mutex;
use sitesearch_core::Document;
use std::collections::{BTreeMap, HashSet};
use url::Url;

/// State shared by every worker of one crawl.
#[derive(Default)]
pub struct CrawlState {
    visited: Mutex<HashSet<String>>,
    documents: Mutex<BTreeMap<String, Document>>,
}

impl CrawlState {
    /// Atomically mark `url` visited. Returns false if it already was, in
    /// which case the caller must not fetch it.
    pub fn try_visit(&self, url: &str) -> bool {
        self.visited.lock().insert(url.to_string())
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.lock().contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.lock().len()
    }

    pub fn insert_document(&self, doc: Document) {
        self.documents.lock().insert(doc.url.clone(), doc);
    }

    pub fn documents(&self) -> BTreeMap<String, Document> {
        self.documents.lock().clone()
    }

    pub fn into_documents(self) -> BTreeMap<String, Document> {
        self.documents.into_inner()
    }
}

/// LIFO worklist holding each URL at most once.
///
/// Pushing a URL that is already waiting moves it to the top, so the stack
/// stays bounded by the number of distinct URLs while the most recently
/// discovered link is still popped first.
#[derive(Default)]
pub struct Frontier {
    stack: Vec<Url>,
    queued: HashSet<String>,
}

impl Frontier {
    pub fn push(&mut self, url: Url) {
        if !self.queued.insert(url.as_str().to_string()) {
            if let Some(at) = self.stack.iter().position(|u| u == &url) {
                self.stack.remove(at);
            }
        }
        self.stack.push(url);
    }

    pub fn pop(&mut self) -> Option<Url> {
        let url = self.stack.pop()?;
        self.queued.remove(url.as_str());
        Some(url)
    }

    pub fn clear(&mut self) {
        self.stack.clear();
        self.queued.clear();
    }

    pub fn len(&self) -> usize { self.stack.len() }

    pub fn is_empty(&self) -> bool { self.stack.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn url(path: &str) -> Url {
        Url::parse("http://site.test/").unwrap().join(path).unwrap()
    }

    #[test]
    fn frontier_holds_each_url_once() {
        let mut frontier = Frontier::default();
        for _ in 0..50 {
            for p in ["/a", "/b", "/c"] {
                frontier.push(url(p));
            }
        }
        assert_eq!(frontier.len(), 3);
    }

    #[test]
    fn repushed_url_moves_to_top() {
        let mut frontier = Frontier::default();
        frontier.push(url("/a"));
        frontier.push(url("/b"));
        frontier.push(url("/a"));

        assert_eq!(frontier.pop(), Some(url("/a")));
        assert_eq!(frontier.pop(), Some(url("/b")));
        assert_eq!(frontier.pop(), None);
        assert!(frontier.is_empty());

        // Popped URLs may be queued again.
        frontier.push(url("/a"));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn each_url_is_claimed_once_across_threads() {
        let state = Arc::new(CrawlState::default());
        let claimed: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let state = state.clone();
                    s.spawn(move || (0..100).filter(|i| state.try_visit(&format!("/{i}"))).count())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });
        assert_eq!(claimed, 100);
        assert_eq!(state.visited_count(), 100);
    }
}
