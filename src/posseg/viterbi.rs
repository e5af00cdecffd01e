//! Viterbi decoder over the joint position/POS state space. Unlike the
//! four-state decoder, both the candidate set and the predecessor set are
//! dynamic: candidates come from the per-rune state table filtered by what
//! the previous column can actually reach.

use fxhash::{FxHashMap, FxHashSet};

use super::model::{State, MODEL};

pub(crate) fn viterbi(obs: &[char]) -> Vec<State> {
    let model = &*MODEL;
    let n = obs.len();
    let mut v: Vec<FxHashMap<State, f64>> = Vec::with_capacity(n);
    let mut mem_path: Vec<FxHashMap<State, State>> = Vec::with_capacity(n);

    let mut first_probs = FxHashMap::default();
    let mut first_path = FxHashMap::default();
    for &y in model.candidates(obs[0]) {
        first_probs.insert(y, model.emit_prob(y, obs[0]) + model.start_prob(y));
        first_path.insert(y, y);
    }
    v.push(first_probs);
    mem_path.push(first_path);

    for t in 1..n {
        let prev_states: Vec<State> = mem_path[t - 1]
            .keys()
            .copied()
            .filter(|x| model.trans.get(x).map(|row| !row.is_empty()).unwrap_or(false))
            .collect();
        let mut reachable: FxHashSet<State> = FxHashSet::default();
        for x in &prev_states {
            for y in model.trans[x].keys() {
                reachable.insert(*y);
            }
        }
        let mut obs_states: Vec<State> = model
            .candidates(obs[t])
            .iter()
            .copied()
            .filter(|s| reachable.contains(s))
            .collect();
        if obs_states.is_empty() {
            obs_states = reachable.into_iter().collect();
        }
        if obs_states.is_empty() {
            obs_states = model.trans_keys.clone();
        }

        let mut probs = FxHashMap::default();
        let mut path = FxHashMap::default();
        for &y in &obs_states {
            let em_prob = model.emit_prob(y, obs[t]);
            // zero-valued default so the column is never left empty
            let mut best: (f64, State) = (0.0, State::default());
            for (i, &y0) in prev_states.iter().enumerate() {
                let prob = v[t - 1][&y0] + model.trans_prob(y0, y) + em_prob;
                if i == 0 || prob > best.0 || (prob == best.0 && y0 > best.1) {
                    best = (prob, y0);
                }
            }
            probs.insert(y, best.0);
            path.insert(y, best.1);
        }
        v.push(probs);
        mem_path.push(path);
    }

    let mut best: Option<(f64, State)> = None;
    for (&y, &prob) in v[n - 1].iter() {
        best = match best {
            None => Some((prob, y)),
            Some((best_prob, best_state)) => {
                if prob > best_prob || (prob == best_prob && y > best_state) {
                    Some((prob, y))
                } else {
                    Some((best_prob, best_state))
                }
            }
        };
    }
    let (_, mut state) = best.unwrap_or_default();

    let mut route = vec![state; n];
    for i in (0..n).rev() {
        route[i] = state;
        state = mem_path[i].get(&state).copied().unwrap_or_default();
    }
    route
}

#[cfg(test)]
mod tests {
    use super::viterbi;

    #[test]
    fn test_viterbi_known_pronoun_verb() {
        let obs: Vec<char> = "我爱".chars().collect();
        let route = viterbi(&obs);
        assert_eq!(route.len(), 2);
        assert_eq!((route[0].role(), route[0].pos()), (b'S', "r"));
        assert_eq!((route[1].role(), route[1].pos()), (b'S', "v"));
    }

    #[test]
    fn test_viterbi_person_name() {
        let obs: Vec<char> = "李小福".chars().collect();
        let route = viterbi(&obs);
        assert_eq!(route[0].role(), b'B');
        assert_eq!(route[1].role(), b'M');
        assert_eq!(route[2].role(), b'E');
        assert!(route.iter().all(|s| s.pos() == "nr"));
    }

    #[test]
    fn test_viterbi_unknown_rune_falls_back() {
        let obs: Vec<char> = "〇〇".chars().collect();
        let route = viterbi(&obs);
        assert_eq!(route.len(), 2);
    }

    #[test]
    fn test_viterbi_long_unknown_sequence() {
        let obs: Vec<char> = "〇〇〇〇〇〇".chars().collect();
        let route = viterbi(&obs);
        assert_eq!(route.len(), obs.len());
    }
}
