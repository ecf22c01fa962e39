//! Prism: the spelling index, resolving typed syllable text to [`SyllableId`]s.
//!
//! Conceptually a double-array trie (see `DESIGN.md` for the relationship to
//! `librime`'s `Prism`); implemented as an in-memory prefix trie for the walk
//! operations (`common_prefix_search`/`expand_search`) plus an `fst::Map` for
//! compact on-disk persistence, the same split the teacher's `Lexicon` makes
//! between its `HashMap` working copy and its `fst_map` serialized form.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::fuzzy::FuzzyMap;
use crate::syllable::{SpellingProperties, SpellingType, SyllableId};

const FORMAT_TAG: &[u8] = b"ime-core.prism.1";

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<char, Box<TrieNode>>,
    /// Present when this node is the end of a complete spelling.
    syllable_id: Option<SyllableId>,
}

impl TrieNode {
    fn insert(&mut self, spelling: &str, id: SyllableId) {
        let mut node = self;
        for ch in spelling.chars() {
            node = node
                .children
                .entry(ch)
                .or_insert_with(|| Box::new(TrieNode::default()));
        }
        node.syllable_id = Some(id);
    }

    /// Walk from `start`, returning every `(end, syllable_id)` where
    /// `input[start..end]` is a complete spelling. Ordered by increasing
    /// length, matching `TrieNode::walk_prefixes` in the teacher's trie.
    fn walk_prefixes(&self, input: &[char], start: usize) -> Vec<(usize, SyllableId)> {
        let mut out = Vec::new();
        let mut node = self;
        let mut idx = start;
        while idx < input.len() {
            match node.children.get(&input[idx]) {
                Some(child) => {
                    node = child;
                    idx += 1;
                    if let Some(id) = node.syllable_id {
                        out.push((idx, id));
                    }
                }
                None => break,
            }
        }
        out
    }

    /// True if `input[start..]` has at least one child under the current
    /// node, i.e. could still complete into a known spelling.
    fn has_continuation(&self, input: &[char], start: usize) -> bool {
        let mut node = self;
        for &ch in &input[start..] {
            match node.children.get(&ch) {
                Some(child) => node = child,
                None => return false,
            }
        }
        true
    }
}

/// The spelling index for one schema's syllabary.
pub struct Prism {
    trie: TrieNode,
    spellings: HashMap<SyllableId, String>,
}

impl Prism {
    pub fn new() -> Self {
        Prism {
            trie: TrieNode::default(),
            spellings: HashMap::new(),
        }
    }

    pub fn build<I: IntoIterator<Item = (String, SyllableId)>>(entries: I) -> Self {
        let mut prism = Prism::new();
        for (spelling, id) in entries {
            prism.trie.insert(&spelling, id);
            prism.spellings.insert(id, spelling);
        }
        prism
    }

    pub fn has_key(&self, spelling: &str) -> bool {
        self.trie
            .walk_prefixes(&spelling.chars().collect::<Vec<_>>(), 0)
            .iter()
            .any(|(end, _)| *end == spelling.chars().count())
    }

    pub fn spelling_of(&self, id: SyllableId) -> Option<&str> {
        self.spellings.get(&id).map(String::as_str)
    }

    /// Every complete spelling starting at `start`, with `Normal` properties.
    /// This is the primary syllable-graph edge source (spec.md §4.2).
    pub fn common_prefix_search(&self, input: &[char], start: usize) -> Vec<(usize, SpellingProperties)> {
        self.trie
            .walk_prefixes(input, start)
            .into_iter()
            .map(|(end, id)| (end, SpellingProperties::normal(id)))
            .collect()
    }

    /// `common_prefix_search` plus fuzzy-rule-derived alternatives, weighted
    /// by the rule's penalty as a credibility multiplier.
    pub fn expand_search(
        &self,
        input: &[char],
        start: usize,
        fuzzy: &FuzzyMap,
    ) -> Vec<(usize, SpellingProperties)> {
        let mut out = self.common_prefix_search(input, start);
        // Re-try every substring length starting at `start` under each of its
        // fuzzy alternatives, the same breadth `FuzzyMap::expand_sequence`
        // explores for a whole syllable sequence, here applied per-edge.
        for end in (start + 1)..=input.len() {
            let candidate: String = input[start..end].iter().collect();
            for (alt, penalty) in fuzzy.alternatives(&candidate) {
                if penalty == 0.0 {
                    continue;
                }
                let alt_chars: Vec<char> = alt.chars().collect();
                if let Some(id) = self.exact_id(&alt_chars) {
                    out.push((
                        end,
                        SpellingProperties {
                            syllable_id: id,
                            spelling_type: SpellingType::Fuzzy,
                            credibility: (1.0 / penalty.max(1.0)).min(1.0),
                        },
                    ));
                }
            }
        }
        out
    }

    fn exact_id(&self, spelling: &[char]) -> Option<SyllableId> {
        self.trie
            .walk_prefixes(spelling, 0)
            .into_iter()
            .find(|(end, _)| *end == spelling.len())
            .map(|(_, id)| id)
    }

    /// True if `input[start..]` is a prefix of some known spelling (used by
    /// segmentors to decide whether to keep accumulating an ambiguous
    /// syllable rather than reject it outright).
    pub fn is_prefix(&self, input: &[char], start: usize) -> bool {
        self.trie.has_continuation(input, start)
    }

    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let mut entries: Vec<(String, u64)> = self
            .spellings
            .iter()
            .map(|(id, s)| (s.clone(), id.0 as u64))
            .collect();
        entries.sort();
        let mut builder = fst::MapBuilder::memory();
        for (k, v) in &entries {
            builder
                .insert(k, *v)
                .map_err(|e| CoreError::Corrupt(e.to_string()))?;
        }
        let fst_bytes = builder
            .into_inner()
            .map_err(|e| CoreError::Corrupt(e.to_string()))?;
        let file = File::create(path)?;
        let mut w = BufWriter::new(file);
        w.write_all(FORMAT_TAG)?;
        w.write_all(&(fst_bytes.len() as u64).to_le_bytes())?;
        w.write_all(&fst_bytes)?;
        Ok(())
    }

    pub fn load(path: &Path) -> CoreResult<Self> {
        let file = File::open(path)?;
        let mut r = BufReader::new(file);
        let mut tag = vec![0u8; FORMAT_TAG.len()];
        r.read_exact(&mut tag)?;
        if tag != FORMAT_TAG {
            return Err(CoreError::Corrupt("prism format tag mismatch".into()));
        }
        let mut len_buf = [0u8; 8];
        r.read_exact(&mut len_buf)?;
        let len = u64::from_le_bytes(len_buf) as usize;
        let mut fst_bytes = vec![0u8; len];
        r.read_exact(&mut fst_bytes)?;
        let fst_map = fst::Map::new(fst_bytes).map_err(|e| CoreError::Corrupt(e.to_string()))?;
        let mut prism = Prism::new();
        let mut stream = fst_map.stream();
        use fst::Streamer;
        while let Some((k, v)) = stream.next() {
            let spelling = String::from_utf8_lossy(k).into_owned();
            let id = SyllableId(v as u32);
            prism.trie.insert(&spelling, id);
            prism.spellings.insert(id, spelling);
        }
        Ok(prism)
    }
}

impl Default for Prism {
    fn default() -> Self {
        Self::new()
    }
}
