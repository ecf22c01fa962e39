//! Syllable graph construction: turns raw input text into a DAG of
//! `(start, end)` spelling edges, the shared input every segmentor and
//! translator downstream works from (spec.md §4.2).
//!
//! Generalizes the teacher's `SyllableParser` trait
//! (`core/src/engine.rs::SyllableParser`) from "parse one best split" to
//! "expose every split", since the table/poet layers need the full graph,
//! not just the top-1 segmentation a single parser would pick.

use std::collections::BTreeMap;

use crate::fuzzy::FuzzyMap;
use crate::prism::Prism;
use crate::syllable::SpellingProperties;

/// A DAG over character positions in the raw input: `edges[start]` holds
/// every `(end, properties)` pair reachable from `start`.
#[derive(Debug, Clone, Default)]
pub struct SyllableGraph {
    pub input_length: usize,
    pub edges: BTreeMap<usize, Vec<(usize, SpellingProperties)>>,
}

impl SyllableGraph {
    pub fn edges_from(&self, start: usize) -> &[(usize, SpellingProperties)] {
        self.edges.get(&start).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True if every position has at least one path reaching `input_length`,
    /// i.e. the input can be fully segmented (spec.md §8 coverage property).
    pub fn is_fully_coverable(&self) -> bool {
        if self.input_length == 0 {
            return true;
        }
        let mut reachable = vec![false; self.input_length + 1];
        reachable[0] = true;
        for start in 0..self.input_length {
            if !reachable[start] {
                continue;
            }
            for (end, _) in self.edges_from(start) {
                reachable[*end] = true;
            }
        }
        reachable[self.input_length]
    }
}

/// Builds a [`SyllableGraph`] for a schema's prism + fuzzy rules.
pub struct Syllabifier<'a> {
    prism: &'a Prism,
    fuzzy: &'a FuzzyMap,
    fuzzy_enabled: bool,
}

impl<'a> Syllabifier<'a> {
    pub fn new(prism: &'a Prism, fuzzy: &'a FuzzyMap, fuzzy_enabled: bool) -> Self {
        Syllabifier {
            prism,
            fuzzy,
            fuzzy_enabled,
        }
    }

    pub fn build(&self, input: &str) -> SyllableGraph {
        let chars: Vec<char> = input.chars().collect();
        let mut graph = SyllableGraph {
            input_length: chars.len(),
            edges: BTreeMap::new(),
        };
        for start in 0..chars.len() {
            let hits = if self.fuzzy_enabled {
                self.prism.expand_search(&chars, start, self.fuzzy)
            } else {
                self.prism.common_prefix_search(&chars, start)
            };
            if !hits.is_empty() {
                graph.edges.insert(start, hits);
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syllable::SyllableId;

    #[test]
    fn fully_coverable_when_every_position_splits() {
        let prism = Prism::build(vec![
            ("ni".to_string(), SyllableId(1)),
            ("hao".to_string(), SyllableId(2)),
        ]);
        let fuzzy = FuzzyMap::new();
        let syl = Syllabifier::new(&prism, &fuzzy, false);
        let graph = syl.build("nihao");
        assert!(graph.is_fully_coverable());
    }

    #[test]
    fn not_coverable_with_unknown_trailing_text() {
        let prism = Prism::build(vec![("ni".to_string(), SyllableId(1))]);
        let fuzzy = FuzzyMap::new();
        let syl = Syllabifier::new(&prism, &fuzzy, false);
        let graph = syl.build("nixyz");
        assert!(!graph.is_fully_coverable());
    }
}
