//! Poet: turns a word graph into a full-sentence candidate via dynamic
//! programming (spec.md §4.8).
//!
//! The DP shape (best-sentence-per-end-position array) is grounded on
//! `core/src/engine.rs::Engine::generate_candidates_from_segmentation`; the
//! exact recurrence — skip the trivial `(0, total_length)` edge, keep at
//! most `max_homophones_in_mind` entries per edge, multiply in a flat
//! `sentence_penalty` per word — is taken from
//! `examples/original_source/include/rime/algo/poet.h`'s `MakeSentence`.

use std::collections::BTreeMap;

use crate::dict_entry::DictEntry;

#[derive(Debug, Clone)]
pub struct SentenceWord {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone)]
struct PartialSentence {
    words: Vec<SentenceWord>,
    weight: f64,
}

/// `word_graph[end_pos]` holds every dictionary entry ending at `end_pos`,
/// keyed by its start position — the same shape as `librime`'s `WordGraph`.
pub type WordGraph = BTreeMap<usize, Vec<DictEntry>>;

pub struct Poet {
    pub max_homophones_in_mind: usize,
    pub sentence_penalty: f64,
}

impl Poet {
    pub fn new(max_homophones_in_mind: usize, sentence_penalty: f64) -> Self {
        Poet {
            max_homophones_in_mind,
            sentence_penalty,
        }
    }

    /// Build the best full sentence spanning `[0, total_length)`, or `None`
    /// if no path reaches the end.
    pub fn make_sentence(&self, word_graph: &WordGraph, total_length: usize) -> Option<Vec<SentenceWord>> {
        let mut best: BTreeMap<usize, PartialSentence> = BTreeMap::new();
        best.insert(
            0,
            PartialSentence {
                words: Vec::new(),
                weight: 1.0,
            },
        );

        for start_pos in 0..total_length {
            let Some(from) = best.get(&start_pos).cloned() else {
                continue;
            };
            // Entries ending anywhere, grouped by end_pos; a WordGraph is
            // indexed by end_pos, so scan the whole graph for edges that
            // begin at start_pos.
            for (&end_pos, entries_at_end) in word_graph.iter() {
                if end_pos <= start_pos {
                    continue;
                }
                // Skip the whole-input single edge, exactly as poet.h does,
                // so a sentence is never just one giant dictionary phrase.
                if start_pos == 0 && end_pos == total_length {
                    continue;
                }
                let mut candidates: Vec<&DictEntry> = entries_at_end
                    .iter()
                    .filter(|e| e.start == start_pos)
                    .collect();
                if candidates.is_empty() {
                    continue;
                }
                candidates.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal));
                candidates.truncate(self.max_homophones_in_mind.max(1));

                for entry in candidates {
                    let new_weight = from.weight * (entry.weight as f64).max(1e-200) * self.sentence_penalty;
                    let mut new_words = from.words.clone();
                    new_words.push(SentenceWord {
                        text: entry.text.clone(),
                        start: entry.start,
                        end: entry.end,
                    });
                    let better = match best.get(&end_pos) {
                        Some(existing) => new_weight > existing.weight,
                        None => true,
                    };
                    if better {
                        best.insert(
                            end_pos,
                            PartialSentence {
                                words: new_words,
                                weight: new_weight,
                            },
                        );
                    }
                }
            }
        }

        best.get(&total_length).map(|s| s.words.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syllable::{Code, SyllableId};

    fn entry(text: &str, start: usize, end: usize, weight: f32) -> DictEntry {
        DictEntry {
            text: text.into(),
            code: Code(vec![SyllableId(0)]),
            start,
            end,
            weight,
        }
    }

    #[test]
    fn skips_single_whole_span_edge() {
        let mut graph = WordGraph::new();
        graph.insert(4, vec![entry("整句", 0, 4, 100.0)]);
        let poet = Poet::new(1, 1e-8);
        assert!(poet.make_sentence(&graph, 4).is_none());
    }

    #[test]
    fn composes_best_path_from_two_words() {
        let mut graph = WordGraph::new();
        graph.insert(2, vec![entry("你好", 0, 2, 50.0)]);
        graph.insert(4, vec![entry("吗", 2, 4, 20.0), entry("嘛", 2, 4, 5.0)]);
        let poet = Poet::new(1, 1e-8);
        let sentence = poet.make_sentence(&graph, 4).unwrap();
        let text: String = sentence.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(text, "你好吗");
    }
}
