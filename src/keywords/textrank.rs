//! TextRank keyword extraction: a PageRank-style iteration over the
//! co-occurrence graph of POS-filtered segments.

use fxhash::{FxHashMap, FxHashSet};
use ordered_float::OrderedFloat;

use super::Keyword;
use crate::posseg::PosSegmenter;

const DAMPING_FACTOR: f64 = 0.85;
const SPAN: usize = 5;
const ITERATIONS: usize = 10;

static DEFAULT_ALLOW_POS: [&str; 4] = ["ns", "n", "vn", "v"];

struct UndirectedWeightedGraph {
    graph: FxHashMap<String, Vec<(String, u64)>>,
    keys: Vec<String>,
}

impl UndirectedWeightedGraph {
    fn new() -> Self {
        UndirectedWeightedGraph {
            graph: FxHashMap::default(),
            keys: Vec::new(),
        }
    }

    fn add_edge(&mut self, start: &str, end: &str, weight: u64) {
        for (from, to) in [(start, end), (end, start)] {
            match self.graph.get_mut(from) {
                Some(edges) => edges.push((to.to_string(), weight)),
                None => {
                    self.keys.push(from.to_string());
                    self.graph.insert(from.to_string(), vec![(to.to_string(), weight)]);
                }
            }
        }
    }

    /// Damped PageRank, updated in place over the lexicographically
    /// sorted node list so identical inputs rank identically.
    fn rank(mut self) -> Vec<Keyword> {
        if self.graph.is_empty() {
            return Vec::new();
        }
        self.keys.sort_unstable();

        let default_weight = 1.0 / self.graph.len() as f64;
        let mut ws: FxHashMap<&str, f64> = FxHashMap::default();
        let mut out_sum: FxHashMap<&str, f64> = FxHashMap::default();
        for (node, edges) in self.graph.iter() {
            ws.insert(node.as_str(), default_weight);
            out_sum.insert(node.as_str(), edges.iter().map(|e| e.1 as f64).sum());
        }

        for _ in 0..ITERATIONS {
            for node in &self.keys {
                let s: f64 = self.graph[node.as_str()]
                    .iter()
                    .map(|(other, weight)| *weight as f64 * ws[other.as_str()] / out_sum[other.as_str()])
                    .sum();
                ws.insert(node.as_str(), (1.0 - DAMPING_FACTOR) + DAMPING_FACTOR * s);
            }
        }

        let mut min_rank = f64::MAX;
        let mut max_rank = f64::MIN;
        for &w in ws.values() {
            if w < min_rank {
                min_rank = w;
            }
            if w > max_rank {
                max_rank = w;
            }
        }

        let mut tags: Vec<Keyword> = self
            .keys
            .iter()
            .map(|node| Keyword {
                keyword: node.clone(),
                weight: (ws[node.as_str()] - min_rank / 10.0) / (max_rank - min_rank / 10.0),
            })
            .collect();
        tags.sort_by(|a, b| {
            (OrderedFloat(b.weight), &b.keyword).cmp(&(OrderedFloat(a.weight), &a.keyword))
        });
        tags
    }
}

/// TextRank keyword extraction over a borrowed [`PosSegmenter`].
///
/// Requires the `textrank` feature.
#[derive(Debug)]
pub struct TextRanker<'a> {
    seg: &'a PosSegmenter,
}

impl<'a> TextRanker<'a> {
    pub fn new_with_segmenter(seg: &'a PosSegmenter) -> Self {
        TextRanker { seg }
    }

    /// Extracts up to `top_k` keywords among segments tagged `ns`, `n`,
    /// `vn` or `v`.
    pub fn text_rank(&self, sentence: &str, top_k: usize) -> Vec<Keyword> {
        self.text_rank_with_pos(sentence, top_k, &DEFAULT_ALLOW_POS)
    }

    /// Extracts up to `top_k` keywords among segments whose POS tag is in
    /// `allow_pos`. Co-occurrence is counted inside a five-segment window
    /// over the tagged sequence, with the filter applied at both ends.
    pub fn text_rank_with_pos(&self, sentence: &str, top_k: usize, allow_pos: &[&str]) -> Vec<Keyword> {
        let pos_filter: FxHashSet<&str> = allow_pos.iter().copied().collect();
        let pairs = self.seg.cut(sentence, true);

        let mut cooccurrence: FxHashMap<u64, u64> = FxHashMap::default();
        let mut endpoints: FxHashMap<u64, (&str, &str)> = FxHashMap::default();
        for i in 0..pairs.len() {
            if !pos_filter.contains(pairs[i].tag) {
                continue;
            }
            for j in i + 1..(i + SPAN).min(pairs.len()) {
                if !pos_filter.contains(pairs[j].tag) {
                    continue;
                }
                let hash = pair_hash(pairs[i].word, pairs[j].word);
                *cooccurrence.entry(hash).or_insert(0) += 1;
                endpoints.entry(hash).or_insert((pairs[i].word, pairs[j].word));
            }
        }

        let mut graph = UndirectedWeightedGraph::new();
        for (hash, weight) in cooccurrence.iter() {
            let (start, end) = endpoints[hash];
            graph.add_edge(start, end, *weight);
        }

        let mut tags = graph.rank();
        tags.truncate(top_k);
        tags
    }
}

fn pair_hash(a: &str, b: &str) -> u64 {
    let mut key = Vec::with_capacity(a.len() + b.len() + 1);
    key.extend_from_slice(a.as_bytes());
    key.push(b'\t');
    key.extend_from_slice(b.as_bytes());
    fxhash::hash64(&key)
}
