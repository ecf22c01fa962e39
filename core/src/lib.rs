//! ime-core
//!
//! The schema-agnostic engine described as "THE CORE" of a modular CJK input
//! method framework: syllable graphs, dictionary lookup, a DP sentence-maker
//! ("poet"), a user dictionary with decayed-frequency learning, and the
//! processor/segmentor/translator/filter pipeline that a concrete schema
//! (e.g. `ime-pinyin`) wires up against an `Engine`.
//!
//! Public API:
//! - `Engine` / `Service` / `Session` - pipeline orchestration and multi-session hosting
//! - `Dictionary` / `Prism` / `Table` - on-disk lookup structures
//! - `Context` / `Composition` / `Candidate` / `Menu` - per-session working state
//! - `UserDb` - persistent user learning with decayed weights
//! - `Config` - schema-wide configuration

pub mod error;
pub use error::{CoreError, CoreResult};

pub mod syllable;
pub use syllable::{Code, SpellingProperties, SpellingType, SyllableId};

pub mod fuzzy;
pub use fuzzy::{FuzzyMap, FuzzyRule};

pub mod prism;
pub use prism::Prism;

pub mod table;
pub use table::{Entry, Table};

pub mod dict_entry;
pub use dict_entry::DictEntry;

pub mod syllabifier;
pub use syllabifier::{SyllableGraph, Syllabifier};

pub mod dictionary;
pub use dictionary::Dictionary;

pub mod composition;
pub use composition::{Composition, Manner, Segment};

pub mod candidate;
pub use candidate::{Candidate, CandidateKind, Menu};

pub mod context;
pub use context::{Context, ContextSnapshot, InputPurpose, NotifierEvent};

pub mod userdict;
pub use userdict::UserDb;

pub mod poet;
pub use poet::{Poet, SentenceWord, WordGraph};

pub mod pipeline;
pub use pipeline::{
    AbcSegmentor, AsciiComposerProcessor, AsciiSegmentor, CjkMinifierFilter, EditorProcessor,
    FallbackSegmentor, Filter, KeyEvent, NavigatorProcessor, ProcessResult, Processor,
    PunctSegmentor, PunctuatorProcessor, Segmentor, SelectorProcessor, ShapeProcessor,
    SimplifierFilter, SingleCharFilter, SingleCharMode, Translator, UniquifierFilter,
};

pub mod engine;
pub use engine::Engine;

pub mod config;
pub use config::Config;

pub mod session;
pub use session::{InputMode, Session};

pub mod service;
pub use service::{Service, SessionId, Status};

/// Utility helpers shared across schemas.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }

    /// Convert ASCII characters to full-width equivalents.
    ///
    /// This converts:
    /// - ASCII letters (A-Z, a-z) → Full-width letters (Ａ-Ｚ, ａ-ｚ)
    /// - ASCII digits (0-9) → Full-width digits (０-９)
    /// - ASCII space → Ideographic space (　)
    /// - ASCII punctuation → Full-width punctuation
    ///
    /// Non-ASCII characters are passed through unchanged.
    pub fn to_fullwidth(s: &str) -> String {
        s.chars()
            .map(|ch| match ch {
                ' ' => '\u{3000}',
                '!'..='~' => {
                    let code = ch as u32;
                    char::from_u32(code - 0x21 + 0xFF01).unwrap_or(ch)
                }
                _ => ch,
            })
            .collect()
    }

    /// Convert full-width characters back to ASCII (half-width).
    pub fn to_halfwidth(s: &str) -> String {
        s.chars()
            .map(|ch| match ch {
                '\u{3000}' => ' ',
                '\u{FF01}'..='\u{FF5E}' => {
                    let code = ch as u32;
                    char::from_u32(code - 0xFF01 + 0x21).unwrap_or(ch)
                }
                _ => ch,
            })
            .collect()
    }
}
