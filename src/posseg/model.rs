//! Joint position/POS model tables, parsed once from the embedded model
//! file into process-wide statics.

use fxhash::FxHashMap;
use lazy_static::lazy_static;

pub(crate) const MIN_FLOAT: f64 = -3.14e100;

static MODEL_DATA: &str = include_str!("../data/pos_hmm.model");

/// Tags the joint model can assign. The low byte of a [`State`] indexes
/// this table.
static POS_TAGS: [&str; 16] = [
    "a", "d", "f", "m", "n", "nr", "ns", "nt", "nz", "p", "q", "r", "t", "u", "v", "vn",
];

/// A joint hidden state packing the position role (`B`, `M`, `E` or `S`,
/// high byte) and the POS tag index (low byte) into one 16-bit value. The
/// derived ordering doubles as the deterministic tie-break; the default is
/// the all-zero value the decoder falls back to when a column has no
/// usable predecessor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct State(u16);

impl State {
    fn new(role: u8, pos_index: usize) -> State {
        State(((role as u16) << 8) | pos_index as u16)
    }

    /// The position role byte, one of `b'B'`, `b'M'`, `b'E'`, `b'S'`.
    #[inline]
    pub(crate) fn role(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// The POS tag this state carries.
    #[inline]
    pub(crate) fn pos(self) -> &'static str {
        POS_TAGS[(self.0 & 0xff) as usize]
    }
}

pub(crate) struct Model {
    start: FxHashMap<State, f64>,
    pub(crate) trans: FxHashMap<State, FxHashMap<State, f64>>,
    /// Every state owning a transition row, sorted. The last-resort
    /// candidate set of the decoder.
    pub(crate) trans_keys: Vec<State>,
    emit: FxHashMap<State, FxHashMap<char, f64>>,
    char_states: FxHashMap<char, Vec<State>>,
    /// The full state universe, sorted. Candidate fallback for runes the
    /// model has never seen.
    states: Vec<State>,
}

impl Model {
    #[inline]
    pub(crate) fn start_prob(&self, state: State) -> f64 {
        self.start.get(&state).copied().unwrap_or(MIN_FLOAT)
    }

    #[inline]
    pub(crate) fn trans_prob(&self, from: State, to: State) -> f64 {
        self.trans
            .get(&from)
            .and_then(|row| row.get(&to))
            .copied()
            .unwrap_or(MIN_FLOAT)
    }

    #[inline]
    pub(crate) fn emit_prob(&self, state: State, ch: char) -> f64 {
        self.emit
            .get(&state)
            .and_then(|row| row.get(&ch))
            .copied()
            .unwrap_or(MIN_FLOAT)
    }

    /// Candidate states for a rune, falling back to the whole universe for
    /// runes without an entry.
    #[inline]
    pub(crate) fn candidates(&self, ch: char) -> &[State] {
        self.char_states.get(&ch).map(|s| s.as_slice()).unwrap_or(&self.states)
    }

    fn parse(data: &str) -> Model {
        let mut start = FxHashMap::default();
        let mut trans: FxHashMap<State, FxHashMap<State, f64>> = FxHashMap::default();
        let mut emit: FxHashMap<State, FxHashMap<char, f64>> = FxHashMap::default();
        let mut char_states: FxHashMap<char, Vec<State>> = FxHashMap::default();
        let mut universe: Vec<State> = Vec::new();

        let mut section = "";
        for line in data.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(marker) = line.strip_prefix('#') {
                match marker {
                    "start" | "trans" | "emit" | "char_state" => section = marker,
                    _ => {}
                }
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            match section {
                "start" => {
                    let state = parse_state(fields[0], fields[1]);
                    start.insert(state, parse_prob(fields[2]));
                    universe.push(state);
                }
                "trans" => {
                    let from = parse_state(fields[0], fields[1]);
                    let to = parse_state(fields[2], fields[3]);
                    trans.entry(from).or_default().insert(to, parse_prob(fields[4]));
                    universe.push(from);
                    universe.push(to);
                }
                "emit" => {
                    let state = parse_state(fields[0], fields[1]);
                    let ch = parse_char(fields[2]);
                    emit.entry(state).or_default().insert(ch, parse_prob(fields[3]));
                    universe.push(state);
                }
                "char_state" => {
                    let ch = parse_char(fields[0]);
                    let states = fields[1..]
                        .iter()
                        .map(|entry| {
                            let (role, tag) = entry
                                .split_once(':')
                                .expect("malformed char_state entry in pos_hmm.model");
                            parse_state(role, tag)
                        })
                        .collect();
                    char_states.insert(ch, states);
                }
                _ => {}
            }
        }

        universe.sort_unstable();
        universe.dedup();
        let mut trans_keys: Vec<State> = trans.keys().copied().collect();
        trans_keys.sort_unstable();

        Model {
            start,
            trans,
            trans_keys,
            emit,
            char_states,
            states: universe,
        }
    }
}

fn parse_state(role: &str, tag: &str) -> State {
    let pos_index = POS_TAGS
        .iter()
        .position(|t| *t == tag)
        .expect("unknown pos tag in pos_hmm.model");
    State::new(role.as_bytes()[0], pos_index)
}

fn parse_prob(field: &str) -> f64 {
    field.parse().expect("malformed probability in pos_hmm.model")
}

fn parse_char(field: &str) -> char {
    field.chars().next().expect("empty rune in pos_hmm.model")
}

lazy_static! {
    pub(crate) static ref MODEL: Model = Model::parse(MODEL_DATA);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_packing() {
        let state = parse_state("B", "ns");
        assert_eq!(state.role(), b'B');
        assert_eq!(state.pos(), "ns");
    }

    #[test]
    fn test_state_ordering_prefers_larger_role() {
        let b = parse_state("B", "v");
        let s = parse_state("S", "v");
        assert!(s > b);
    }

    #[test]
    fn test_model_tables() {
        let model = &*MODEL;
        let sr = parse_state("S", "r");
        let sv = parse_state("S", "v");
        assert!(model.start_prob(sr) > MIN_FLOAT);
        assert!(model.trans_prob(sr, sv) > MIN_FLOAT);
        assert!(model.emit_prob(sr, '我') > MIN_FLOAT);
        assert_eq!(model.emit_prob(sr, '〇'), MIN_FLOAT);
        assert_eq!(model.candidates('我'), &[parse_state("B", "r"), sr]);
        assert!(!model.candidates('〇').is_empty());
    }
}
