//! Dictionary records, the prefix-frequency dictionary and the line-based
//! file parser shared by every token sink.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use fxhash::FxHashMap;

use crate::errors::{Error, Result};

/// A single dictionary record: a word, its corpus frequency and an
/// optional part-of-speech tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    text: String,
    frequency: f64,
    pos: String,
}

impl Token {
    pub fn new(text: impl Into<String>, frequency: f64, pos: impl Into<String>) -> Self {
        Token {
            text: text.into(),
            frequency,
            pos: pos.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn pos(&self) -> &str {
        &self.pos
    }
}

/// Anything that can absorb dictionary records.
///
/// The file parser is polymorphic over this trait; [`PrefixDict`],
/// [`PosDict`], the IDF table and the stop-word set all implement it.
pub trait TokenSink {
    /// Adds a single record, updating any derived state immediately.
    fn add_token(&mut self, token: Token);

    /// Adds a batch of records. Derived state (such as the cached
    /// log-total) is refreshed once after the whole batch is in.
    fn load(&mut self, tokens: Vec<Token>);
}

/// Parses the `word freq [pos]` line format. The byte-order mark is
/// stripped from the first field, fields are whitespace-separated and
/// blank lines are skipped. A malformed frequency fails the whole load.
pub(crate) fn read_tokens<R: BufRead>(reader: R) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let mut fields = line.split_whitespace();
        let text = match fields.next() {
            Some(field) => field.trim_start_matches('\u{feff}').trim(),
            None => continue,
        };
        if text.is_empty() {
            continue;
        }
        let frequency = match fields.next() {
            Some(field) => field
                .parse::<f64>()
                .map_err(|_| Error::InvalidDictEntry(line.trim().to_string()))?,
            None => 0.0,
        };
        let pos = fields.next().map(|field| field.trim()).unwrap_or("");
        tokens.push(Token::new(text, frequency, pos));
    }
    Ok(tokens)
}

/// Reads the given source and feeds every record to the sink as one batch.
pub fn load_tokens<S: TokenSink, R: BufRead>(sink: &mut S, reader: R) -> Result<()> {
    let tokens = read_tokens(reader)?;
    sink.load(tokens);
    Ok(())
}

/// Reads the file at `path` and feeds every record to the sink as one batch.
pub fn load_tokens_at<S: TokenSink, P: AsRef<Path>>(sink: &mut S, path: P) -> Result<()> {
    let file = File::open(path)?;
    load_tokens(sink, BufReader::new(file))
}

/// Word-to-frequency map augmented with zero-frequency entries for every
/// proper prefix of every word, so that DAG construction can extend a
/// candidate fragment with a plain hash lookup and stop as soon as the
/// fragment is not even a prefix.
#[derive(Debug, Default)]
pub struct PrefixDict {
    freq: FxHashMap<String, f64>,
    total: f64,
    log_total: f64,
}

impl PrefixDict {
    /// Returns a word's frequency. `Some(0.0)` marks a pure prefix entry,
    /// `None` means the key is not a prefix of any word.
    #[inline]
    pub fn frequency(&self, word: &str) -> Option<f64> {
        self.freq.get(word).copied()
    }

    pub(crate) fn total(&self) -> f64 {
        self.total
    }

    pub(crate) fn log_total(&self) -> f64 {
        self.log_total
    }

    fn insert_token(&mut self, token: Token) {
        let Token { text, frequency, .. } = token;
        self.total += frequency;
        self.freq.insert(text.clone(), frequency);
        // every rune prefix becomes a continuation marker unless it
        // already is a word in its own right
        for (i, _) in text.char_indices().skip(1) {
            let prefix = &text[..i];
            if !self.freq.contains_key(prefix) {
                self.freq.insert(prefix.to_string(), 0.0);
            }
        }
    }

    fn update_log_total(&mut self) {
        self.log_total = self.total.ln();
    }
}

impl TokenSink for PrefixDict {
    fn add_token(&mut self, token: Token) {
        self.insert_token(token);
        self.update_log_total();
    }

    fn load(&mut self, tokens: Vec<Token>) {
        for token in tokens {
            self.insert_token(token);
        }
        self.update_log_total();
    }
}

/// [`PrefixDict`] plus a word-to-POS map. Words without a tag in the
/// dictionary read as `"x"` at the use sites.
#[derive(Debug, Default)]
pub struct PosDict {
    dict: PrefixDict,
    pos: FxHashMap<String, String>,
}

impl PosDict {
    #[inline]
    pub fn frequency(&self, word: &str) -> Option<f64> {
        self.dict.frequency(word)
    }

    /// Returns the POS tag recorded for `word`, if any.
    #[inline]
    pub fn pos(&self, word: &str) -> Option<&str> {
        self.pos.get(word).map(|tag| tag.as_str())
    }

    pub(crate) fn prefix_dict(&self) -> &PrefixDict {
        &self.dict
    }
}

impl TokenSink for PosDict {
    fn add_token(&mut self, token: Token) {
        if !token.pos().is_empty() {
            self.pos.insert(token.text().to_string(), token.pos().to_string());
        }
        self.dict.add_token(token);
    }

    fn load(&mut self, tokens: Vec<Token>) {
        for token in tokens {
            if !token.pos().is_empty() {
                self.pos.insert(token.text().to_string(), token.pos().to_string());
            }
            self.dict.insert_token(token);
        }
        self.dict.update_log_total();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_closure() {
        let mut dict = PrefixDict::default();
        load_tokens(&mut dict, "长江大桥 1000 ns\n".as_bytes()).unwrap();
        assert_eq!(dict.frequency("长江大桥"), Some(1000.0));
        assert_eq!(dict.frequency("长江大"), Some(0.0));
        assert_eq!(dict.frequency("长江"), Some(0.0));
        assert_eq!(dict.frequency("长"), Some(0.0));
        assert_eq!(dict.frequency("江"), None);
    }

    #[test]
    fn test_prefix_does_not_clobber_word() {
        let mut dict = PrefixDict::default();
        load_tokens(&mut dict, "长江 500 ns\n长江大桥 1000 ns\n".as_bytes()).unwrap();
        assert_eq!(dict.frequency("长江"), Some(500.0));
        // reversed load order: the real frequency wins over the prefix marker
        let mut dict = PrefixDict::default();
        load_tokens(&mut dict, "长江大桥 1000 ns\n长江 500 ns\n".as_bytes()).unwrap();
        assert_eq!(dict.frequency("长江"), Some(500.0));
    }

    #[test]
    fn test_log_total() {
        let mut dict = PrefixDict::default();
        load_tokens(&mut dict, "天气 2\n今天 3\n".as_bytes()).unwrap();
        assert!((dict.total() - 5.0).abs() < 1e-12);
        assert!((dict.log_total() - 5.0f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_bom_and_blank_lines() {
        let mut dict = PrefixDict::default();
        load_tokens(&mut dict, "\u{feff}天气 2 n\n\n  \n好 1 a\n".as_bytes()).unwrap();
        assert_eq!(dict.frequency("天气"), Some(2.0));
        assert_eq!(dict.frequency("好"), Some(1.0));
    }

    #[test]
    fn test_invalid_frequency() {
        let mut dict = PrefixDict::default();
        let err = load_tokens(&mut dict, "天气 abc n\n".as_bytes()).unwrap_err();
        match err {
            Error::InvalidDictEntry(entry) => assert_eq!(entry, "天气 abc n"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_pos_dict() {
        let mut dict = PosDict::default();
        load_tokens(&mut dict, "北京 4000 ns\n天气 800\n".as_bytes()).unwrap();
        assert_eq!(dict.pos("北京"), Some("ns"));
        assert_eq!(dict.pos("天气"), None);
        assert_eq!(dict.frequency("北京"), Some(4000.0));
    }
}
