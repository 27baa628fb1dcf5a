use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could",
            "did","do","does","doing","down","during",
            "each","few","for","from","further",
            "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","it","its","itself",
            "me","more","most","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","should","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","very",
            "was","we","were","what","when","where","which","while","who","whom","why","with","would",
            "you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Term filters applied after splitting. Stored in the index so queries
/// are analyzed exactly like the documents were.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// English Snowball stemming ("eggs" -> "egg").
    pub stem: bool,
    pub remove_stopwords: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self { stem: true, remove_stopwords: false }
    }
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Tokenize text into terms with the default configuration.
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_with(text, &TokenizerConfig::default())
}

/// Tokenize text into terms, in order: NFKC normalization, lowercase,
/// split on runs of Unicode letters and digits, then the configured filters.
pub fn tokenize_with(text: &str, config: &TokenizerConfig) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized)
        .map(|mat| mat.as_str())
        .filter(|token| !(config.remove_stopwords && is_stopword(token)))
        .map(|token| if config.stem { STEMMER.stem(token).into_owned() } else { token.to_string() })
        .collect()
}
