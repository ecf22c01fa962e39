//! Syllable identifiers and spelling metadata.
//!
//! A [`Code`] is the input-side key (what the user typed, segmented into
//! syllables); a [`SyllableId`] is the dictionary-side key it resolves to.
//! [`SpellingType`]/[`SpellingProperties`] mirror the credibility-weighted
//! fuzzy-alternative model in `fuzzy.rs`, generalized to tag each
//! syllable-graph edge with how it was produced.

use serde::{Deserialize, Serialize};

/// Index into a schema's syllabary. Stable across a single loaded dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SyllableId(pub u32);

/// A sequence of syllable ids, the unit a [`crate::table::Table`] is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Code(pub Vec<SyllableId>);

impl Code {
    pub fn push(&mut self, id: SyllableId) {
        self.0.push(id);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How a spelling edge in the syllable graph was matched against the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpellingType {
    /// Exact, unabbreviated spelling.
    Normal,
    /// A shorter form accepted as a prefix of a longer spelling (e.g. first
    /// letters of a shuangpin scheme).
    Abbreviation,
    /// Produced by a fuzzy/correction rule (see `fuzzy.rs`).
    Fuzzy,
    /// Accepted despite being an incomplete spelling (only a prefix of any
    /// known syllable).
    Ambiguous,
}

/// Per-edge metadata the syllable graph attaches to every `(start, end)`
/// spelling match, generalizing `fuzzy.rs`'s penalty model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpellingProperties {
    pub syllable_id: SyllableId,
    pub spelling_type: SpellingType,
    /// 1.0 for a normal match; fuzzy/abbreviated matches are penalized by
    /// multiplying this down, mirroring `FuzzyRule::penalty`.
    pub credibility: f32,
}

impl SpellingProperties {
    pub fn normal(syllable_id: SyllableId) -> Self {
        SpellingProperties {
            syllable_id,
            spelling_type: SpellingType::Normal,
            credibility: 1.0,
        }
    }

    pub fn fuzzy(syllable_id: SyllableId, credibility: f32) -> Self {
        SpellingProperties {
            syllable_id,
            spelling_type: SpellingType::Fuzzy,
            credibility,
        }
    }
}
