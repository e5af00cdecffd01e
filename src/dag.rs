//! Per-sentence word lattice and the max-log-probability route over it.

use smallvec::SmallVec;

use crate::dict::PrefixDict;

/// For every starting rune index, the rune indices at which a positive
/// frequency dictionary word ends. A start with no match carries itself as
/// the single-rune fallback.
pub(crate) type Dag = Vec<SmallVec<[usize; 5]>>;

/// Builds the DAG by extending a fragment one rune at a time until the
/// fragment is not even a prefix of any dictionary word.
pub(crate) fn build(dict: &PrefixDict, sentence: &str, char_indices: &[usize]) -> Dag {
    let word_count = char_indices.len();
    let mut dag = Vec::with_capacity(word_count);
    for (k, &byte_start) in char_indices.iter().enumerate() {
        let mut tmplist = SmallVec::new();
        let mut i = k;
        let mut frag = if k + 1 < word_count {
            &sentence[byte_start..char_indices[k + 1]]
        } else {
            &sentence[byte_start..]
        };
        while i < word_count {
            match dict.frequency(frag) {
                Some(freq) => {
                    if freq > 0.0 {
                        tmplist.push(i);
                    }
                    i += 1;
                    if i >= word_count {
                        break;
                    }
                    frag = if i + 1 < word_count {
                        &sentence[byte_start..char_indices[i + 1]]
                    } else {
                        &sentence[byte_start..]
                    };
                }
                None => break,
            }
        }
        if tmplist.is_empty() {
            tmplist.push(k);
        }
        dag.push(tmplist);
    }
    dag
}

/// Reverse dynamic program over the DAG. `rs[k]` holds the best
/// log-probability achievable from rune `k` to the end together with the
/// end index of the chosen first word; `rs[n]` is the `(0, 0)` sentinel.
/// Fragments absent from the dictionary count as `ln(1)`; present entries
/// contribute their literal frequency, so a pure prefix entry scores
/// `ln(0)`. Ties go to the smaller end index.
pub(crate) fn route(
    dict: &PrefixDict,
    sentence: &str,
    char_indices: &[usize],
    dag: &Dag,
) -> Vec<(f64, usize)> {
    let word_count = char_indices.len();
    let log_total = dict.log_total();
    let mut rs = vec![(0.0, 0); word_count + 1];
    for k in (0..word_count).rev() {
        let mut best: Option<(f64, usize)> = None;
        for &i in dag[k].iter() {
            let byte_start = char_indices[k];
            let frag = if i + 1 < word_count {
                &sentence[byte_start..char_indices[i + 1]]
            } else {
                &sentence[byte_start..]
            };
            let log_freq = match dict.frequency(frag) {
                Some(freq) => freq.ln(),
                None => 0.0,
            };
            let prob = log_freq - log_total + rs[i + 1].0;
            best = match best {
                None => Some((prob, i)),
                Some((best_prob, best_index)) => {
                    if prob > best_prob || (prob == best_prob && i < best_index) {
                        Some((prob, i))
                    } else {
                        Some((best_prob, best_index))
                    }
                }
            };
        }
        rs[k] = best.unwrap_or((0.0, 0));
    }
    rs
}
