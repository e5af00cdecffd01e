//! Unknown-word recovery over the four position states `B M E S` with the
//! classical Viterbi decoder. Used by the segmenter when a span of
//! single-rune route picks is not itself a dictionary word.

use std::cmp::Ordering;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{SplitMatches, SplitState};

lazy_static! {
    static ref RE_HAN: Regex = Regex::new(r"(\p{Han}+)").unwrap();
    static ref RE_SKIP: Regex = Regex::new(r"([a-zA-Z0-9]+(?:.\d+)?%?)").unwrap();
}

pub(crate) const NUM_STATES: usize = 4;

type StateSet = [f64; NUM_STATES];

#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy)]
pub(crate) enum Status {
    B = 0,
    E = 1,
    M = 2,
    S = 3,
}

// allowed predecessors, indexed by Status
static PREV_STATUS: [[Status; 2]; NUM_STATES] = [
    [Status::E, Status::S], // B
    [Status::B, Status::M], // E
    [Status::M, Status::B], // M
    [Status::S, Status::E], // S
];

include!(concat!(env!("OUT_DIR"), "/hmm_prob.rs"));

const MIN_FLOAT: f64 = -3.14e100;

pub(crate) fn viterbi(sentence: &str, char_indices: &[usize]) -> Vec<Status> {
    assert!(!char_indices.is_empty());

    let states = [Status::B, Status::M, Status::E, Status::S];
    let r = states.len();
    let c = char_indices.len();
    let mut v = vec![0.0; r * c];
    let mut prev: Vec<Option<Status>> = vec![None; r * c];

    let first_word = if char_indices.len() > 1 {
        &sentence[char_indices[0]..char_indices[1]]
    } else {
        sentence
    };
    for y in &states {
        v[*y as usize] =
            INITIAL_PROBS[*y as usize] + EMIT_PROBS[*y as usize].get(first_word).cloned().unwrap_or(MIN_FLOAT);
    }

    for t in 1..c {
        for y in &states {
            let byte_start = char_indices[t];
            let byte_end = if t + 1 < c { char_indices[t + 1] } else { sentence.len() };
            let word = &sentence[byte_start..byte_end];
            let em_prob = EMIT_PROBS[*y as usize].get(word).cloned().unwrap_or(MIN_FLOAT);
            // equal probabilities go to the larger state, which the tuple
            // ordering encodes
            let (prob, state) = PREV_STATUS[*y as usize]
                .iter()
                .map(|y0| {
                    (
                        v[(t - 1) * r + (*y0 as usize)]
                            + TRANS_PROBS[*y0 as usize][*y as usize]
                            + em_prob,
                        *y0,
                    )
                })
                .max_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal))
                .unwrap();
            let idx = t * r + (*y as usize);
            v[idx] = prob;
            prev[idx] = Some(state);
        }
    }

    // a word can only end in E or S
    let (_prob, state) = [Status::E, Status::S]
        .iter()
        .map(|y| (v[(c - 1) * r + (*y as usize)], y))
        .max_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal))
        .unwrap();

    let mut best_path = vec![Status::B; c];
    let mut t = c - 1;
    let mut curr = *state;
    best_path[t] = *state;
    while let Some(p) = prev[t * r + (curr as usize)] {
        assert!(t > 0);
        best_path[t - 1] = p;
        curr = p;
        t -= 1;
    }

    best_path
}

fn cut_han<'a>(sentence: &'a str, char_indices: Vec<usize>, words: &mut Vec<&'a str>) {
    let path = viterbi(sentence, &char_indices);
    let mut begin = 0;
    let mut next_i = 0;
    for (i, state) in path.iter().enumerate() {
        match state {
            Status::B => begin = i,
            Status::E => {
                let byte_start = char_indices[begin];
                let byte_end = if i + 1 < char_indices.len() {
                    char_indices[i + 1]
                } else {
                    sentence.len()
                };
                words.push(&sentence[byte_start..byte_end]);
                next_i = i + 1;
            }
            Status::S => {
                let byte_start = char_indices[i];
                let byte_end = if i + 1 < char_indices.len() {
                    char_indices[i + 1]
                } else {
                    sentence.len()
                };
                words.push(&sentence[byte_start..byte_end]);
                next_i = i + 1;
            }
            Status::M => { /* do nothing */ }
        }
    }
    if next_i < char_indices.len() {
        let byte_start = char_indices[next_i];
        words.push(&sentence[byte_start..]);
    }
}

/// Cuts a sentence into words with the Hidden Markov Model alone. Han runs
/// are decoded with Viterbi; alphanumeric runs are kept together and
/// anything else is emitted as it comes.
pub fn cut<'a>(sentence: &'a str, words: &mut Vec<&'a str>) {
    for state in SplitMatches::new(&RE_HAN, sentence) {
        let block = state.into_str();
        if block.is_empty() {
            continue;
        }
        if RE_HAN.is_match(block) {
            if block.chars().count() > 1 {
                let char_indices: Vec<usize> = block.char_indices().map(|x| x.0).collect();
                cut_han(block, char_indices, words);
            } else {
                words.push(block);
            }
        } else {
            for skip_state in SplitMatches::new(&RE_SKIP, block) {
                let word = match skip_state {
                    SplitState::Matched(word) => word,
                    SplitState::Unmatched(word) => word,
                };
                if !word.is_empty() {
                    words.push(word);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{cut, viterbi};

    #[test]
    fn test_viterbi() {
        use super::Status::*;

        let sentence = "我们是程序员";
        let char_indices: Vec<usize> = sentence.char_indices().map(|x| x.0).collect();
        let path = viterbi(sentence, &char_indices);
        assert_eq!(path, vec![B, E, S, B, M, E]);
    }

    #[test]
    fn test_viterbi_terminates_in_e_or_s() {
        use super::Status::*;

        for sentence in ["年龄", "中出了", "我爱", "岁"] {
            let char_indices: Vec<usize> = sentence.char_indices().map(|x| x.0).collect();
            let path = viterbi(sentence, &char_indices);
            assert!(matches!(path[path.len() - 1], E | S), "path {:?}", path);
        }
    }

    #[test]
    fn test_hmm_cut() {
        let sentence = "我们是程序员";
        let mut words = Vec::with_capacity(sentence.chars().count() / 2);
        cut(sentence, &mut words);
        assert_eq!(words, vec!["我们", "是", "程序员"]);
    }

    #[test]
    fn test_hmm_cut_ascii() {
        let mut words = Vec::new();
        cut("I'm a programmer!", &mut words);
        assert_eq!(words.len(), 8);
        assert_eq!(words, vec!["I", "'", "m", " ", "a", " ", "programmer", "!"]);
    }

    #[test]
    fn test_hmm_cut_mixed() {
        let mut words = Vec::new();
        cut("程序员average年龄28.6岁。", &mut words);
        assert_eq!(words, vec!["程序员", "average", "年龄", "28.6", "岁", "。"]);
    }
}
