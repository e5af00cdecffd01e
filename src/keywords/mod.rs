//! Keyword extraction on top of the segmenters.

use std::collections::BTreeSet;

use hashbrown::HashSet;
use lazy_static::lazy_static;

use crate::dict::{Token, TokenSink};

#[cfg(feature = "tfidf")]
pub mod tfidf;
#[cfg(feature = "textrank")]
pub mod textrank;

lazy_static! {
    /// English stop words shipped with the crate.
    pub static ref DEFAULT_STOP_WORDS: BTreeSet<String> = {
        let words = [
            "the", "of", "is", "and", "to", "in", "that", "we", "for", "an", "are", "by", "be", "as", "on", "with",
            "can", "if", "from", "which", "you", "it", "this", "then", "at", "have", "all", "not", "one", "has", "or",
        ];
        words.iter().map(|s| String::from(*s)).collect()
    };
}

/// Keyword with weight
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub keyword: String,
    pub weight: f64,
}

/// A stop-word set, pre-seeded with [`struct@DEFAULT_STOP_WORDS`]. Extra
/// words can be merged from any dictionary-format file through the
/// [`TokenSink`] loaders; only the first field of each line is used.
#[derive(Debug, Clone)]
pub struct StopWord {
    words: HashSet<String>,
}

impl StopWord {
    pub fn new() -> Self {
        StopWord {
            words: DEFAULT_STOP_WORDS.iter().cloned().collect(),
        }
    }

    #[inline]
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Adds a stop word, returning whether it was new.
    pub fn insert(&mut self, word: String) -> bool {
        self.words.insert(word)
    }

    /// Removes a stop word, returning whether it was present.
    pub fn remove(&mut self, word: &str) -> bool {
        self.words.remove(word)
    }
}

impl Default for StopWord {
    fn default() -> Self {
        StopWord::new()
    }
}

impl TokenSink for StopWord {
    fn add_token(&mut self, token: Token) {
        self.words.insert(token.text().to_string());
    }

    fn load(&mut self, tokens: Vec<Token>) {
        for token in tokens {
            self.words.insert(token.text().to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::load_tokens;

    #[test]
    fn test_default_stop_words() {
        let stop = StopWord::new();
        assert!(stop.is_stop_word("the"));
        assert!(stop.is_stop_word("with"));
        assert!(!stop.is_stop_word("segmentation"));
    }

    #[test]
    fn test_load_merges() {
        let mut stop = StopWord::new();
        load_tokens(&mut stop, "天气\n啊\n".as_bytes()).unwrap();
        assert!(stop.is_stop_word("the"));
        assert!(stop.is_stop_word("天气"));
        assert!(stop.is_stop_word("啊"));
    }
}
