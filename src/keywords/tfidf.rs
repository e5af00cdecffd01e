//! TF-IDF tag extraction.

use std::io::{BufRead, BufReader};
use std::path::Path;

use hashbrown::HashMap;
use ordered_float::OrderedFloat;

use super::{Keyword, StopWord};
use crate::dict::{self, Token, TokenSink};
use crate::errors::Result;
use crate::Segmenter;

static DEFAULT_IDF: &str = include_str!("../data/idf.txt");

/// Inverse-document-frequency table. Keeps the loaded values sorted so the
/// median, used as the weight of unseen words, is always current.
#[derive(Debug, Default)]
pub struct Idf {
    freq: HashMap<String, f64>,
    freqs: Vec<f64>,
    median: f64,
}

impl Idf {
    pub fn new() -> Self {
        Idf::default()
    }

    #[inline]
    pub fn frequency(&self, word: &str) -> Option<f64> {
        self.freq.get(word).copied()
    }

    /// The lower-middle element of the sorted IDF values.
    #[inline]
    pub fn median(&self) -> f64 {
        self.median
    }

    fn insert(&mut self, token: Token) {
        self.freqs.push(token.frequency());
        self.freq.insert(token.text().to_string(), token.frequency());
    }

    fn update_median(&mut self) {
        self.freqs.sort_by(|a, b| a.total_cmp(b));
        if !self.freqs.is_empty() {
            self.median = self.freqs[self.freqs.len() / 2];
        }
    }
}

impl TokenSink for Idf {
    fn add_token(&mut self, token: Token) {
        self.insert(token);
        self.update_median();
    }

    fn load(&mut self, tokens: Vec<Token>) {
        for token in tokens {
            self.insert(token);
        }
        self.update_median();
    }
}

/// TF-IDF keyword extraction over a borrowed [`Segmenter`].
///
/// Requires the `tfidf` feature.
#[derive(Debug)]
pub struct TagExtractor<'a> {
    seg: &'a Segmenter,
    idf: Idf,
    stop_words: StopWord,
}

impl<'a> TagExtractor<'a> {
    /// Creates an extractor with the embedded IDF table and the default
    /// stop words.
    pub fn new_with_segmenter(seg: &'a Segmenter) -> Self {
        let mut instance = TagExtractor {
            seg,
            idf: Idf::new(),
            stop_words: StopWord::new(),
        };
        dict::load_tokens(&mut instance.idf, BufReader::new(DEFAULT_IDF.as_bytes())).unwrap();
        instance
    }

    /// Replaces the IDF table with the one read from `reader`.
    pub fn load_idf<R: BufRead>(&mut self, reader: R) -> Result<()> {
        self.idf = Idf::new();
        dict::load_tokens(&mut self.idf, reader)
    }

    /// Replaces the IDF table with the one read from the file at `path`.
    pub fn load_idf_at<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.idf = Idf::new();
        dict::load_tokens_at(&mut self.idf, path)
    }

    /// Resets the stop words to the defaults plus the contents of `reader`.
    pub fn load_stop_words<R: BufRead>(&mut self, reader: R) -> Result<()> {
        self.stop_words = StopWord::new();
        dict::load_tokens(&mut self.stop_words, reader)
    }

    /// Resets the stop words to the defaults plus the file at `path`.
    pub fn load_stop_words_at<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.stop_words = StopWord::new();
        dict::load_tokens_at(&mut self.stop_words, path)
    }

    /// Adds a single stop word.
    pub fn add_stop_word(&mut self, word: impl Into<String>) -> bool {
        self.stop_words.insert(word.into())
    }

    /// Removes a single stop word.
    pub fn remove_stop_word(&mut self, word: &str) -> bool {
        self.stop_words.remove(word)
    }

    /// Extracts up to `top_k` keywords, ranked by `idf × tf / total`.
    /// Words missing from the IDF table weigh in at the table's median.
    /// Tokens shorter than two runes and stop words never qualify.
    pub fn extract_tags(&self, sentence: &str, top_k: usize) -> Vec<Keyword> {
        let mut term_freq: HashMap<String, u64> = HashMap::new();
        for word in self.seg.cut(sentence, true) {
            let word = word.trim();
            if word.chars().count() < 2 {
                continue;
            }
            if self.stop_words.is_stop_word(word) {
                continue;
            }
            *term_freq.entry(String::from(word)).or_insert(0) += 1;
        }
        let total: u64 = term_freq.values().sum();
        let mut tags: Vec<Keyword> = term_freq
            .iter()
            .map(|(word, tf)| {
                let idf = self.idf.frequency(word).unwrap_or_else(|| self.idf.median());
                Keyword {
                    keyword: word.clone(),
                    weight: idf * *tf as f64 / total as f64,
                }
            })
            .collect();
        tags.sort_by(|a, b| {
            (OrderedFloat(b.weight), &b.keyword).cmp(&(OrderedFloat(a.weight), &a.keyword))
        });
        tags.truncate(top_k);
        tags
    }
}

#[cfg(all(test, feature = "default-dict"))]
mod tests {
    use super::*;
    use crate::Segmenter;

    static SENTENCE: &str = "今天天气不错，昨天天气不错，天气影响心情";

    #[test]
    fn test_init_with_default_idf() {
        let seg = Segmenter::new();
        let extractor = TagExtractor::new_with_segmenter(&seg);
        assert_eq!(extractor.idf.median(), 6.5);
    }

    #[test]
    fn test_extract_tags() {
        let seg = Segmenter::new();
        let extractor = TagExtractor::new_with_segmenter(&seg);
        let tags = extractor.extract_tags(SENTENCE, 3);
        let words: Vec<&str> = tags.iter().map(|t| t.keyword.as_str()).collect();
        assert_eq!(words, vec!["不错", "天气", "影响"]);
        // tf(不错)=2, idf=6.0, nine counted tokens in total
        assert!((tags[0].weight - 2.0 * 6.0 / 9.0).abs() < 1e-12);
        assert!(tags.windows(2).all(|w| w[0].weight >= w[1].weight));
    }

    #[test]
    fn test_extract_tags_filters_stop_words() {
        let seg = Segmenter::new();
        let mut extractor = TagExtractor::new_with_segmenter(&seg);
        extractor.add_stop_word("天气");
        let tags = extractor.extract_tags(SENTENCE, 10);
        assert!(tags.iter().all(|t| t.keyword != "天气"));
        assert!(tags.iter().all(|t| t.keyword.chars().count() >= 2));
    }

    #[test]
    fn test_top_k_bound() {
        let seg = Segmenter::new();
        let extractor = TagExtractor::new_with_segmenter(&seg);
        for top_k in [0, 1, 2, 100] {
            assert!(extractor.extract_tags(SENTENCE, top_k).len() <= top_k);
        }
    }

    #[test]
    fn test_empty_input() {
        let seg = Segmenter::new();
        let extractor = TagExtractor::new_with_segmenter(&seg);
        assert!(extractor.extract_tags("", 10).is_empty());
    }
}
