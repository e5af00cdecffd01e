//! Part-of-speech segmentation: the same DAG route as the plain cutter,
//! with dictionary tags on known words and a joint position/POS Viterbi
//! decoder for the spans the dictionary does not know.

use std::io::{BufRead, BufReader};
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::dict::{self, PosDict};
use crate::errors::Result;
use crate::{dag, word_slice, SplitMatches, SplitState, RE_HAN_DEFAULT, RE_SKIP_DEFAULT};

mod model;
mod viterbi;

lazy_static! {
    static ref RE_HAN_DETAIL: Regex = Regex::new(r"(\p{Han}+)").unwrap();
    static ref RE_SKIP_DETAIL: Regex = Regex::new(r"([\.[:digit:]]+|[[:alnum:]]+)").unwrap();
    static ref RE_NUM: Regex = Regex::new(r"[\.[:digit:]]+").unwrap();
    static ref RE_ENG: Regex = Regex::new(r"[[:alnum:]]").unwrap();
}

/// A word together with its part-of-speech tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub word: &'a str,
    pub tag: &'a str,
}

impl<'a> Segment<'a> {
    fn new(word: &'a str, tag: &'a str) -> Segment<'a> {
        Segment { word, tag }
    }
}

/// A Chinese word segmenter that labels every emitted word with a POS tag.
///
/// The borrow discipline is the same as [`crate::Segmenter`]'s: `cut` and
/// the lookups take `&self`, dictionary mutation takes `&mut self`.
#[derive(Debug)]
pub struct PosSegmenter {
    dict: PosDict,
}

#[cfg(feature = "default-dict")]
impl Default for PosSegmenter {
    fn default() -> Self {
        PosSegmenter::new()
    }
}

#[cfg(feature = "default-dict")]
impl PosSegmenter {
    /// Creates a POS segmenter loaded with the embedded default
    /// dictionary. Requires the `default-dict` feature.
    pub fn new() -> Self {
        let mut dict = PosDict::default();
        dict::load_tokens(&mut dict, BufReader::new(crate::DEFAULT_DICT.as_bytes())).unwrap();
        PosSegmenter { dict }
    }
}

impl PosSegmenter {
    /// Creates a POS segmenter from a dictionary in the `word freq [pos]`
    /// line format.
    pub fn load_dictionary<R: BufRead>(reader: R) -> Result<PosSegmenter> {
        let mut dict = PosDict::default();
        dict::load_tokens(&mut dict, reader)?;
        Ok(PosSegmenter { dict })
    }

    /// Creates a POS segmenter from a dictionary file at `path`.
    pub fn load_dictionary_at<P: AsRef<Path>>(path: P) -> Result<PosSegmenter> {
        let mut dict = PosDict::default();
        dict::load_tokens_at(&mut dict, path)?;
        Ok(PosSegmenter { dict })
    }

    /// Merges a user dictionary into the loaded one.
    pub fn load_user_dictionary<R: BufRead>(&mut self, reader: R) -> Result<()> {
        dict::load_tokens(&mut self.dict, reader)
    }

    /// Merges a user dictionary file at `path` into the loaded one.
    pub fn load_user_dictionary_at<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        dict::load_tokens_at(&mut self.dict, path)
    }

    /// Returns a word's frequency, `Some(0.0)` marking pure prefix entries.
    pub fn frequency(&self, word: &str) -> Option<f64> {
        self.dict.frequency(word)
    }

    /// Returns the POS tag recorded for a word.
    pub fn pos(&self, word: &str) -> Option<&str> {
        self.dict.pos(word)
    }

    #[inline]
    fn pos_or_x<'a>(&'a self, word: &str) -> &'a str {
        self.dict.pos(word).unwrap_or("x")
    }

    /// Cuts a sentence into tagged words. With `hmm` enabled, unknown
    /// spans go through the joint position/POS model; otherwise adjacent
    /// ASCII letters and digits merge into `eng` segments.
    pub fn cut<'a>(&'a self, sentence: &'a str, hmm: bool) -> Vec<Segment<'a>> {
        let mut segments = Vec::with_capacity(sentence.len() / 2);
        for state in SplitMatches::new(&RE_HAN_DEFAULT, sentence) {
            match state {
                SplitState::Matched(block) => {
                    if block.is_empty() {
                        continue;
                    }
                    if hmm {
                        self.cut_dag_hmm(block, &mut segments);
                    } else {
                        self.cut_dag_no_hmm(block, &mut segments);
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
                                    segments.push(Segment::new(word, "x"));
                                }
                            }
                            SplitState::Unmatched(word) => {
                                classify_runs(word, &mut segments);
                            }
                        }
                    }
                }
            }
        }
        segments
    }

    fn cut_dag_hmm<'a>(&'a self, sentence: &'a str, segments: &mut Vec<Segment<'a>>) {
        let char_indices: Vec<usize> = sentence.char_indices().map(|x| x.0).collect();
        let dag = dag::build(self.dict.prefix_dict(), sentence, &char_indices);
        let route = dag::route(self.dict.prefix_dict(), sentence, &char_indices, &dag);
        let mut x = 0;
        let mut buf: Vec<usize> = Vec::new();
        while x < char_indices.len() {
            let y = route[x].1 + 1;
            if y - x == 1 {
                buf.push(x);
            } else {
                self.flush_buffer(sentence, &char_indices, &mut buf, segments);
                let word = word_slice(sentence, &char_indices, x, y);
                segments.push(Segment::new(word, self.pos_or_x(word)));
            }
            x = y;
        }
        self.flush_buffer(sentence, &char_indices, &mut buf, segments);
    }

    fn flush_buffer<'a>(
        &'a self,
        sentence: &'a str,
        char_indices: &[usize],
        buf: &mut Vec<usize>,
        segments: &mut Vec<Segment<'a>>,
    ) {
        if buf.is_empty() {
            return;
        }
        let word = word_slice(sentence, char_indices, buf[0], buf[buf.len() - 1] + 1);
        if buf.len() == 1 {
            segments.push(Segment::new(word, self.pos_or_x(word)));
        } else if !self.dict.frequency(word).map(|freq| freq > 0.0).unwrap_or(false) {
            self.cut_detail(word, segments);
        } else {
            let mut word_indices = word.char_indices().map(|x| x.0).peekable();
            while let Some(byte_start) = word_indices.next() {
                let rune = if let Some(byte_end) = word_indices.peek() {
                    &word[byte_start..*byte_end]
                } else {
                    &word[byte_start..]
                };
                segments.push(Segment::new(rune, self.pos_or_x(rune)));
            }
        }
        buf.clear();
    }

    fn cut_dag_no_hmm<'a>(&'a self, sentence: &'a str, segments: &mut Vec<Segment<'a>>) {
        let char_indices: Vec<usize> = sentence.char_indices().map(|x| x.0).collect();
        let dag = dag::build(self.dict.prefix_dict(), sentence, &char_indices);
        let route = dag::route(self.dict.prefix_dict(), sentence, &char_indices, &dag);
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
                segments.push(Segment::new(word_slice(sentence, &char_indices, start, x), "eng"));
            }
            segments.push(Segment::new(frag, self.pos_or_x(frag)));
            x = y;
        }
        if let Some(start) = buf_start {
            segments.push(Segment::new(
                word_slice(sentence, &char_indices, start, char_indices.len()),
                "eng",
            ));
        }
    }

    /// Tags a span the dictionary route could not resolve: Han runs are
    /// decoded with the joint model, the rest is classified lexically.
    fn cut_detail<'a>(&self, sentence: &'a str, segments: &mut Vec<Segment<'a>>) {
        for state in SplitMatches::new(&RE_HAN_DETAIL, sentence) {
            match state {
                SplitState::Matched(block) => {
                    if !block.is_empty() {
                        cut_detail_internal(block, segments);
                    }
                }
                SplitState::Unmatched(block) => {
                    for skip_state in SplitMatches::new(&RE_SKIP_DETAIL, block) {
                        let word = skip_state.into_str();
                        if word.is_empty() {
                            continue;
                        }
                        let tag = if RE_NUM.is_match(word) {
                            "m"
                        } else if RE_ENG.is_match(word) {
                            "eng"
                        } else {
                            "x"
                        };
                        segments.push(Segment::new(word, tag));
                    }
                }
            }
        }
    }
}

fn cut_detail_internal<'a>(block: &'a str, segments: &mut Vec<Segment<'a>>) {
    let chars: Vec<char> = block.chars().collect();
    let char_indices: Vec<usize> = block.char_indices().map(|x| x.0).collect();
    let route = viterbi::viterbi(&chars);
    let mut begin = 0;
    let mut next_i = 0;
    for (i, state) in route.iter().enumerate() {
        match state.role() {
            b'B' => begin = i,
            b'E' => {
                segments.push(Segment::new(word_slice(block, &char_indices, begin, i + 1), state.pos()));
                next_i = i + 1;
            }
            b'S' => {
                segments.push(Segment::new(word_slice(block, &char_indices, i, i + 1), state.pos()));
                next_i = i + 1;
            }
            _ => {}
        }
    }
    if next_i < chars.len() {
        segments.push(Segment::new(
            word_slice(block, &char_indices, next_i, chars.len()),
            route[next_i].pos(),
        ));
    }
}

/// Groups a run of non-Han, non-whitespace runes: digits and dots gather
/// into `m` segments, ASCII alphanumerics into `eng`, anything else is
/// emitted rune by rune as `x`.
fn classify_runs<'a>(block: &'a str, segments: &mut Vec<Segment<'a>>) {
    #[derive(PartialEq, Clone, Copy)]
    enum Kind {
        Num,
        Eng,
        Other,
    }
    fn kind_of(ch: char) -> Kind {
        if ch.is_ascii_digit() || ch == '.' {
            Kind::Num
        } else if ch.is_ascii_alphanumeric() {
            Kind::Eng
        } else {
            Kind::Other
        }
    }

    let mut iter = block.char_indices().peekable();
    while let Some((start, ch)) = iter.next() {
        let kind = kind_of(ch);
        let mut end = start + ch.len_utf8();
        if kind != Kind::Other {
            while let Some(&(_, next_ch)) = iter.peek() {
                if kind_of(next_ch) != kind {
                    break;
                }
                end += next_ch.len_utf8();
                iter.next();
            }
        }
        let tag = match kind {
            Kind::Num => "m",
            Kind::Eng => "eng",
            Kind::Other => "x",
        };
        segments.push(Segment::new(&block[start..end], tag));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "default-dict")]
    #[test]
    fn test_cut_with_hmm() {
        let seg = PosSegmenter::new();
        let segments = seg.cut("我爱北京天安门", true);
        let pairs: Vec<(&str, &str)> = segments.iter().map(|s| (s.word, s.tag)).collect();
        assert_eq!(
            pairs,
            vec![("我", "r"), ("爱", "v"), ("北京", "ns"), ("天安门", "ns")]
        );
    }

    #[cfg(feature = "default-dict")]
    #[test]
    fn test_cut_no_hmm_matches_dict_tags() {
        let seg = PosSegmenter::new();
        let segments = seg.cut("我爱北京天安门", false);
        let pairs: Vec<(&str, &str)> = segments.iter().map(|s| (s.word, s.tag)).collect();
        assert_eq!(
            pairs,
            vec![("我", "r"), ("爱", "v"), ("北京", "ns"), ("天安门", "ns")]
        );
    }

    #[cfg(feature = "default-dict")]
    #[test]
    fn test_cut_known_words() {
        let seg = PosSegmenter::new();
        let segments = seg.cut("我来到北京清华大学", true);
        let pairs: Vec<(&str, &str)> = segments.iter().map(|s| (s.word, s.tag)).collect();
        assert_eq!(
            pairs,
            vec![("我", "r"), ("来到", "v"), ("北京", "ns"), ("清华大学", "nt")]
        );
    }

    #[cfg(feature = "default-dict")]
    #[test]
    fn test_cut_no_hmm_coalesces_english() {
        let seg = PosSegmenter::new();
        let segments = seg.cut("iPhone15发布了", false);
        let pairs: Vec<(&str, &str)> = segments.iter().map(|s| (s.word, s.tag)).collect();
        assert_eq!(pairs, vec![("iPhone15", "eng"), ("发布", "v"), ("了", "ul")]);
    }

    #[cfg(feature = "default-dict")]
    #[test]
    fn test_cut_whitespace_and_punct_tagged_x() {
        let seg = PosSegmenter::new();
        let segments = seg.cut("北京 天气，不错", true);
        let pairs: Vec<(&str, &str)> = segments.iter().map(|s| (s.word, s.tag)).collect();
        assert_eq!(
            pairs,
            vec![
                ("北京", "ns"),
                (" ", "x"),
                ("天气", "n"),
                ("，", "x"),
                ("不错", "a")
            ]
        );
    }

    #[test]
    fn test_cut_empty_input() {
        let seg = PosSegmenter::load_dictionary("北京 4000 ns\n".as_bytes()).unwrap();
        assert!(seg.cut("", true).is_empty());
    }

    #[test]
    fn test_classify_runs() {
        let mut segments = Vec::new();
        classify_runs("３。", &mut segments);
        let pairs: Vec<(&str, &str)> = segments.iter().map(|s| (s.word, s.tag)).collect();
        assert_eq!(pairs, vec![("３", "x"), ("。", "x")]);
    }
}
