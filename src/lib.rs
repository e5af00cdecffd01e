//! Chinese word segmentation with a prefix-frequency dictionary, DAG
//! routing and hidden-Markov-model fallback for unknown words.
//!
//! The segmenter cuts a sentence mixing Han characters, ASCII letters,
//! digits, punctuation and whitespace into an ordered token sequence
//! covering every input character. Part-of-speech tagging
//! ([`posseg::PosSegmenter`]) and keyword extraction
//! ([`keywords::tfidf::TagExtractor`], [`keywords::textrank::TextRanker`])
//! are layered on top of it.
//!
//! ```rust
//! use hanseg::Segmenter;
//!
//! let seg = Segmenter::new();
//! let words = seg.cut("我爱北京天安门", true);
//! assert_eq!(words, vec!["我", "爱", "北京", "天安门"]);
//! ```

use std::io::{BufRead, BufReader};
use std::path::Path;

use lazy_static::lazy_static;
use regex::{Matches, Regex};

mod dag;
pub mod dict;
mod errors;
pub mod hmm;
#[cfg(any(feature = "tfidf", feature = "textrank"))]
pub mod keywords;
pub mod posseg;

pub use crate::dict::{load_tokens, load_tokens_at, PosDict, PrefixDict, Token, TokenSink};
pub use crate::errors::{Error, Result};
pub use crate::posseg::{PosSegmenter, Segment};
#[cfg(feature = "tfidf")]
pub use crate::keywords::tfidf::{Idf, TagExtractor};
#[cfg(feature = "textrank")]
pub use crate::keywords::textrank::TextRanker;
#[cfg(any(feature = "tfidf", feature = "textrank"))]
pub use crate::keywords::{Keyword, StopWord};

#[cfg(feature = "default-dict")]
pub(crate) static DEFAULT_DICT: &str = include_str!("data/dict.txt");

lazy_static! {
    pub(crate) static ref RE_HAN_DEFAULT: Regex = Regex::new(r"([\p{Han}a-zA-Z0-9+#&\._]+)").unwrap();
    pub(crate) static ref RE_SKIP_DEFAULT: Regex = Regex::new(r"(\r\n|\s)").unwrap();
    static ref RE_HAN_CUT_ALL: Regex = Regex::new(r"(\p{Han}+)").unwrap();
    static ref RE_SKIP_CUT_ALL: Regex = Regex::new(r"[^a-zA-Z0-9+#\n]").unwrap();
}

pub(crate) struct SplitMatches<'r, 't> {
    finder: Matches<'r, 't>,
    text: &'t str,
    last: usize,
    matched: Option<&'t str>,
}

impl<'r, 't> SplitMatches<'r, 't> {
    #[inline]
    pub(crate) fn new(re: &'r Regex, text: &'t str) -> SplitMatches<'r, 't> {
        SplitMatches {
            finder: re.find_iter(text),
            text,
            last: 0,
            matched: None,
        }
    }
}

#[derive(Debug)]
pub(crate) enum SplitState<'t> {
    Unmatched(&'t str),
    Matched(&'t str),
}

impl<'t> SplitState<'t> {
    #[inline]
    pub(crate) fn into_str(self) -> &'t str {
        match self {
            SplitState::Unmatched(t) => t,
            SplitState::Matched(t) => t,
        }
    }
}

impl<'r, 't> Iterator for SplitMatches<'r, 't> {
    type Item = SplitState<'t>;

    fn next(&mut self) -> Option<SplitState<'t>> {
        if let Some(matched) = self.matched.take() {
            return Some(SplitState::Matched(matched));
        }
        match self.finder.next() {
            None => {
                if self.last >= self.text.len() {
                    None
                } else {
                    let s = &self.text[self.last..];
                    self.last = self.text.len();
                    Some(SplitState::Unmatched(s))
                }
            }
            Some(m) => {
                let unmatched = &self.text[self.last..m.start()];
                self.last = m.end();
                self.matched = Some(m.as_str());
                Some(SplitState::Unmatched(unmatched))
            }
        }
    }
}

#[inline]
pub(crate) fn word_slice<'a>(sentence: &'a str, char_indices: &[usize], start: usize, end: usize) -> &'a str {
    let byte_start = char_indices[start];
    if end < char_indices.len() {
        &sentence[byte_start..char_indices[end]]
    } else {
        &sentence[byte_start..]
    }
}

/// A Chinese word segmenter backed by a prefix-frequency dictionary.
///
/// Reading operations (`cut*`, `frequency`, `suggest_frequency`) take
/// `&self` and are safe to call from many threads at once; mutating
/// operations (`add_word`, `delete_word`, the user-dictionary loaders)
/// take `&mut self`. Wrap the segmenter in a `std::sync::RwLock` when the
/// dictionary has to change while readers are active.
#[derive(Debug)]
pub struct Segmenter {
    dict: PrefixDict,
}

#[cfg(feature = "default-dict")]
impl Default for Segmenter {
    fn default() -> Self {
        Segmenter::new()
    }
}

impl Segmenter {
    /// Creates a segmenter loaded with the embedded default dictionary.
    ///
    /// Requires the `default-dict` feature.
    #[cfg(feature = "default-dict")]
    pub fn new() -> Self {
        let mut dict = PrefixDict::default();
        dict::load_tokens(&mut dict, BufReader::new(DEFAULT_DICT.as_bytes())).unwrap();
        Segmenter { dict }
    }

    /// Creates a segmenter from a dictionary in the `word freq [pos]`
    /// line format.
    pub fn load_dictionary<R: BufRead>(reader: R) -> Result<Segmenter> {
        let mut dict = PrefixDict::default();
        dict::load_tokens(&mut dict, reader)?;
        Ok(Segmenter { dict })
    }

    /// Creates a segmenter from a dictionary file at `path`.
    pub fn load_dictionary_at<P: AsRef<Path>>(path: P) -> Result<Segmenter> {
        let mut dict = PrefixDict::default();
        dict::load_tokens_at(&mut dict, path)?;
        Ok(Segmenter { dict })
    }

    /// Merges a user dictionary into the loaded one. Existing entries are
    /// overridden, nothing is cleared.
    pub fn load_user_dictionary<R: BufRead>(&mut self, reader: R) -> Result<()> {
        dict::load_tokens(&mut self.dict, reader)
    }

    /// Merges a user dictionary file at `path` into the loaded one.
    pub fn load_user_dictionary_at<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        dict::load_tokens_at(&mut self.dict, path)
    }

    /// Returns a word's frequency. `Some(0.0)` means the key is only a
    /// prefix of longer words; `None` means it is not even that.
    pub fn frequency(&self, word: &str) -> Option<f64> {
        self.dict.frequency(word)
    }

    /// Adds a word with the given frequency to the dictionary.
    pub fn add_word(&mut self, word: &str, frequency: f64) {
        self.dict.add_token(Token::new(word, frequency, ""));
    }

    /// Removes a word by zeroing its frequency. Its prefix entries stay
    /// behind as continuations for other words.
    pub fn delete_word(&mut self, word: &str) {
        self.dict.add_token(Token::new(word, 0.0, ""));
    }

    /// Suggests the frequency of a word (single input) needed to keep it
    /// from being split, or of the joined word (multiple inputs) needed to
    /// keep the inputs apart.
    pub fn suggest_frequency(&self, words: &[&str]) -> f64 {
        if words.is_empty() {
            return 1.0;
        }
        let total = self.dict.total();
        let mut frequency = 1.0;
        if words.len() > 1 {
            for word in words {
                if let Some(freq) = self.dict.frequency(word) {
                    frequency *= freq;
                }
                frequency /= total;
            }
            frequency = (frequency * total).trunc();
            let word_freq = self.dict.frequency(&words.concat()).unwrap_or(0.0);
            if word_freq < frequency {
                frequency = word_freq;
            }
            return frequency;
        }
        let word = words[0];
        for segment in self.cut(word, false) {
            if let Some(freq) = self.dict.frequency(segment) {
                frequency *= freq;
            }
            frequency /= total;
        }
        frequency = (frequency * total).trunc();
        frequency += 1.0;
        let word_freq = self.dict.frequency(word).unwrap_or(1.0);
        if word_freq > frequency {
            frequency = word_freq;
        }
        frequency
    }

    fn flush_buffer<'a>(
        &self,
        sentence: &'a str,
        char_indices: &[usize],
        buf: &mut Vec<usize>,
        words: &mut Vec<&'a str>,
    ) {
        if buf.is_empty() {
            return;
        }
        let word = word_slice(sentence, char_indices, buf[0], buf[buf.len() - 1] + 1);
        if buf.len() == 1 {
            words.push(word);
        } else if !self.dict.frequency(word).map(|freq| freq > 0.0).unwrap_or(false) {
            hmm::cut(word, words);
        } else {
            let mut word_indices = word.char_indices().map(|x| x.0).peekable();
            while let Some(byte_start) = word_indices.next() {
                if let Some(byte_end) = word_indices.peek() {
                    words.push(&word[byte_start..*byte_end]);
                } else {
                    words.push(&word[byte_start..]);
                }
            }
        }
        buf.clear();
    }

    fn cut_dag_hmm<'a>(&self, sentence: &'a str, words: &mut Vec<&'a str>) {
        let char_indices: Vec<usize> = sentence.char_indices().map(|x| x.0).collect();
        let dag = dag::build(&self.dict, sentence, &char_indices);
        let route = dag::route(&self.dict, sentence, &char_indices, &dag);
        let mut x = 0;
        let mut buf: Vec<usize> = Vec::new();
        while x < char_indices.len() {
            let y = route[x].1 + 1;
            if y - x == 1 {
                buf.push(x);
            } else {
                self.flush_buffer(sentence, &char_indices, &mut buf, words);
                words.push(word_slice(sentence, &char_indices, x, y));
            }
            x = y;
        }
        self.flush_buffer(sentence, &char_indices, &mut buf, words);
    }

    fn cut_dag_no_hmm<'a>(&self, sentence: &'a str, words: &mut Vec<&'a str>) {
        let char_indices: Vec<usize> = sentence.char_indices().map(|x| x.0).collect();
        let dag = dag::build(&self.dict, sentence, &char_indices);
        let route = dag::route(&self.dict, sentence, &char_indices, &dag);
        let mut x = 0;
        let mut buf_start: Option<usize> = None;
        while x < char_indices.len() {
            let y = route[x].1 + 1;
            let frag = word_slice(sentence, &char_indices, x, y);
            if y - x == 1 && frag.chars().all(|ch| ch.is_ascii_alphanumeric()) {
                buf_start.get_or_insert(x);
                x = y;
                continue;
            }
            if let Some(start) = buf_start.take() {
                words.push(word_slice(sentence, &char_indices, start, x));
            }
            words.push(frag);
            x = y;
        }
        if let Some(start) = buf_start {
            words.push(word_slice(sentence, &char_indices, start, char_indices.len()));
        }
    }

    fn cut_all_internal<'a>(&self, sentence: &'a str, words: &mut Vec<&'a str>) {
        let char_indices: Vec<usize> = sentence.char_indices().map(|x| x.0).collect();
        let dag = dag::build(&self.dict, sentence, &char_indices);
        let mut start: isize = -1;
        for (k, list) in dag.iter().enumerate() {
            if list.len() == 1 && k as isize > start {
                words.push(word_slice(sentence, &char_indices, k, list[0] + 1));
                start = list[0] as isize;
                continue;
            }
            for &j in list.iter() {
                if j > k {
                    words.push(word_slice(sentence, &char_indices, k, j + 1));
                    start = j as isize;
                }
            }
        }
    }

    /// Cuts a sentence into words using accurate mode.
    ///
    /// With `hmm` enabled, spans the dictionary does not know are handed
    /// to the hidden Markov model to recover unknown words; otherwise
    /// adjacent single ASCII letters and digits are merged back together.
    pub fn cut<'a>(&self, sentence: &'a str, hmm: bool) -> Vec<&'a str> {
        let mut words = Vec::with_capacity(sentence.len() / 2);
        for state in SplitMatches::new(&RE_HAN_DEFAULT, sentence) {
            match state {
                SplitState::Matched(block) => {
                    if block.is_empty() {
                        continue;
                    }
                    if hmm {
                        self.cut_dag_hmm(block, &mut words);
                    } else {
                        self.cut_dag_no_hmm(block, &mut words);
                    }
                }
                SplitState::Unmatched(block) => {
                    if block.is_empty() {
                        continue;
                    }
                    for skip_state in SplitMatches::new(&RE_SKIP_DEFAULT, block) {
                        match skip_state {
                            SplitState::Matched(word) => {
                                if !word.is_empty() {
                                    words.push(word);
                                }
                            }
                            SplitState::Unmatched(word) => {
                                let mut word_indices = word.char_indices().map(|x| x.0).peekable();
                                while let Some(byte_start) = word_indices.next() {
                                    if let Some(byte_end) = word_indices.peek() {
                                        words.push(&word[byte_start..*byte_end]);
                                    } else {
                                        words.push(&word[byte_start..]);
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        words
    }

    /// Cuts a sentence into words using full mode, enumerating every
    /// dictionary word found in the Han runs. Fast but not accurate.
    pub fn cut_all<'a>(&self, sentence: &'a str) -> Vec<&'a str> {
        let mut words = Vec::with_capacity(sentence.len() / 2);
        for state in SplitMatches::new(&RE_HAN_CUT_ALL, sentence) {
            match state {
                SplitState::Matched(block) => {
                    if !block.is_empty() {
                        self.cut_all_internal(block, &mut words);
                    }
                }
                SplitState::Unmatched(block) => {
                    for piece in RE_SKIP_CUT_ALL.split(block) {
                        if !piece.is_empty() {
                            words.push(piece);
                        }
                    }
                }
            }
        }
        words
    }

    /// Cuts a sentence for search-engine indexing: accurate mode, plus
    /// every dictionary 2-gram and 3-gram found inside longer words,
    /// emitted ahead of the word itself.
    pub fn cut_for_search<'a>(&self, sentence: &'a str, hmm: bool) -> Vec<&'a str> {
        let words = self.cut(sentence, hmm);
        let mut new_words = Vec::with_capacity(words.len());
        for word in words {
            let char_indices: Vec<usize> = word.char_indices().map(|x| x.0).collect();
            let char_count = char_indices.len();
            for gram in [2usize, 3] {
                if char_count <= gram {
                    continue;
                }
                for i in 0..char_count - gram + 1 {
                    let piece = word_slice(word, &char_indices, i, i + gram);
                    if self.dict.frequency(piece).map(|freq| freq > 0.0).unwrap_or(false) {
                        new_words.push(piece);
                    }
                }
            }
            new_words.push(word);
        }
        new_words
    }
}
