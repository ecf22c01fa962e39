//! Pipeline traits and the concrete schema-generic stages built against
//! them: processors, segmentors, translators, filters.
//!
//! Grounded on the teacher's `Editor` trait (`core/src/editor.rs`:
//! `process_key`/`can_handle`/`reset`) and `ImeEngine::process_key`'s
//! mode-routing dispatch (`core/src/ime_engine.rs`), generalized from "one
//! of three hardcoded editors" to the schema-registered, ordered stage list
//! spec.md §2/§4 describes. Error handling follows spec.md §7: no stage
//! returns `Result` into the pipeline, each reports a small enum or `bool`
//! and swallows internal failure into "no-op" plus a `tracing::error!` call.

use std::collections::HashSet;

use crate::candidate::Candidate;
use crate::context::{Context, NotifierEvent};
use crate::syllabifier::SyllableGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Up,
    Down,
    PageUp,
    PageDown,
    Enter,
    Escape,
    Space,
    Tab,
    Number(u8),
    /// Schema-bound ascii-mode toggle. `KeyEvent` has no modifier keys
    /// (spec.md's grammar never names one), so a host binds whatever key it
    /// likes to this synthetic event rather than us inventing a Shift field.
    ToggleAsciiMode,
    ToggleFullShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// The key was consumed; stop running further processors.
    Accepted,
    /// This processor does not want the key; try the next one.
    Rejected,
    /// The key was consumed but produced no visible change.
    Noop,
}

/// Consumes key events and mutates [`Context`] (spec.md §4.3/§4.4).
pub trait Processor {
    fn name(&self) -> &str;
    fn process(&self, ctx: &mut Context, key: KeyEvent) -> ProcessResult;
}

/// Claims a run of the raw input starting at `pos` and reports where it
/// ends (exclusive), or `None` to defer to the next registered segmentor
/// (spec.md §4.2/§4.4). Operates over the whole composition, not a single
/// syllable graph — this is what builds `Composition`'s `Segment`s, distinct
/// from [`crate::syllabifier::Syllabifier`] which builds a `SyllableGraph`
/// *within* an already-claimed segment.
pub trait Segmentor {
    fn name(&self) -> &str;
    fn segment(&self, chars: &[char], pos: usize) -> Option<usize>;
}

/// Produces candidates for one segment's syllable graph (spec.md §4.6/§4.8).
/// `input`/`graph` are segment-local: position 0 is the segment's start, not
/// the whole composition's. `Engine::refresh_menu` offsets the results back
/// into composition-global coordinates afterward. Returns `None` rather than
/// an empty `Vec` when this translator has nothing to say about the segment
/// at all, distinguishing "no opinion" from "opinion: nothing matches".
pub trait Translator {
    fn name(&self) -> &str;
    fn translate(&self, input: &str, graph: &SyllableGraph) -> Option<Vec<Candidate>>;
}

/// Post-processes a merged candidate stream (spec.md §4.9): reordering,
/// deduplication, masking. Filters never fail outward; an internal error is
/// logged and the input stream is passed through unchanged.
pub trait Filter {
    fn name(&self) -> &str;
    fn filter(&self, candidates: Vec<Candidate>) -> Vec<Candidate>;
}

fn prev_char_boundary(s: &str, cursor: usize) -> usize {
    s[..cursor].char_indices().next_back().map(|(i, _)| i).unwrap_or(0)
}

fn next_char_boundary(s: &str, cursor: usize) -> usize {
    s[cursor..].char_indices().nth(1).map(|(i, _)| cursor + i).unwrap_or(s.len())
}

// ---------------------------------------------------------------------
// Segmentors (spec.md §4.4)
// ---------------------------------------------------------------------

/// Claims maximal runs of ASCII letters, leaving the pinyin syllabifier to
/// run within the span a schema's own speller processor already accumulated.
pub struct AbcSegmentor;

impl Segmentor for AbcSegmentor {
    fn name(&self) -> &str {
        "abc_segmentor"
    }

    fn segment(&self, chars: &[char], pos: usize) -> Option<usize> {
        if !chars[pos].is_ascii_alphabetic() {
            return None;
        }
        let mut end = pos;
        while end < chars.len() && chars[end].is_ascii_alphabetic() {
            end += 1;
        }
        Some(end)
    }
}

/// Claims a single ASCII punctuation character.
pub struct PunctSegmentor;

impl Segmentor for PunctSegmentor {
    fn name(&self) -> &str {
        "punct_segmentor"
    }

    fn segment(&self, chars: &[char], pos: usize) -> Option<usize> {
        chars[pos].is_ascii_punctuation().then_some(pos + 1)
    }
}

/// Claims a single ASCII digit or whitespace character.
pub struct AsciiSegmentor;

impl Segmentor for AsciiSegmentor {
    fn name(&self) -> &str {
        "ascii_segmentor"
    }

    fn segment(&self, chars: &[char], pos: usize) -> Option<usize> {
        let c = chars[pos];
        (c.is_ascii() && (c.is_ascii_digit() || c.is_ascii_whitespace())).then_some(pos + 1)
    }
}

/// Claims whatever no earlier segmentor wanted. Always registered last so
/// every position in the input is eventually covered.
pub struct FallbackSegmentor;

impl Segmentor for FallbackSegmentor {
    fn name(&self) -> &str {
        "fallback_segmentor"
    }

    fn segment(&self, chars: &[char], pos: usize) -> Option<usize> {
        Some(chars.len().max(pos + 1))
    }
}

// ---------------------------------------------------------------------
// Processors (spec.md §4.3)
// ---------------------------------------------------------------------

/// Digit keys, Space, and paging keys select a candidate from the active
/// segment's menu.
pub struct SelectorProcessor;

impl Processor for SelectorProcessor {
    fn name(&self) -> &str {
        "selector_processor"
    }

    fn process(&self, ctx: &mut Context, key: KeyEvent) -> ProcessResult {
        if ctx.menu.is_empty() {
            return ProcessResult::Rejected;
        }
        match key {
            KeyEvent::Number(n) => {
                let page_index = if n == 0 { 9 } else { (n as usize) - 1 };
                if ctx.select(page_index) {
                    ProcessResult::Accepted
                } else {
                    ProcessResult::Rejected
                }
            }
            KeyEvent::Space => {
                let cursor = ctx.menu.cursor();
                if ctx.select(cursor) {
                    ProcessResult::Accepted
                } else {
                    ProcessResult::Rejected
                }
            }
            KeyEvent::PageUp => {
                if ctx.menu.page_up() {
                    ctx.notify(NotifierEvent::Update);
                    ProcessResult::Accepted
                } else {
                    ProcessResult::Noop
                }
            }
            KeyEvent::PageDown => {
                if ctx.menu.page_down() {
                    ctx.notify(NotifierEvent::Update);
                    ProcessResult::Accepted
                } else {
                    ProcessResult::Noop
                }
            }
            _ => ProcessResult::Rejected,
        }
    }
}

/// Caret movement within the raw input, and cursor movement within the menu.
pub struct NavigatorProcessor;

impl Processor for NavigatorProcessor {
    fn name(&self) -> &str {
        "navigator_processor"
    }

    fn process(&self, ctx: &mut Context, key: KeyEvent) -> ProcessResult {
        match key {
            KeyEvent::Left if ctx.is_composing() => {
                if ctx.cursor == 0 {
                    ProcessResult::Noop
                } else {
                    ctx.cursor = prev_char_boundary(&ctx.input, ctx.cursor);
                    ProcessResult::Accepted
                }
            }
            KeyEvent::Right if ctx.is_composing() => {
                if ctx.cursor == ctx.input.len() {
                    ProcessResult::Noop
                } else {
                    ctx.cursor = next_char_boundary(&ctx.input, ctx.cursor);
                    ProcessResult::Accepted
                }
            }
            KeyEvent::Home if ctx.is_composing() => {
                ctx.cursor = 0;
                ProcessResult::Accepted
            }
            KeyEvent::End if ctx.is_composing() => {
                ctx.cursor = ctx.input.len();
                ProcessResult::Accepted
            }
            KeyEvent::Up if !ctx.menu.is_empty() => {
                if ctx.menu.cursor_up() {
                    ctx.notify(NotifierEvent::Update);
                    ProcessResult::Accepted
                } else {
                    ProcessResult::Noop
                }
            }
            KeyEvent::Down if !ctx.menu.is_empty() => {
                if ctx.menu.cursor_down() {
                    ctx.notify(NotifierEvent::Update);
                    ProcessResult::Accepted
                } else {
                    ProcessResult::Noop
                }
            }
            _ => ProcessResult::Rejected,
        }
    }
}

/// Enter confirms the active segment (committing if it was the last one);
/// Escape clears the composition outright.
pub struct EditorProcessor;

impl Processor for EditorProcessor {
    fn name(&self) -> &str {
        "editor_processor"
    }

    fn process(&self, ctx: &mut Context, key: KeyEvent) -> ProcessResult {
        if !ctx.is_composing() {
            return ProcessResult::Rejected;
        }
        match key {
            KeyEvent::Enter => {
                if !ctx.menu.is_empty() && ctx.composition.has_unconfirmed() {
                    ctx.select(ctx.menu.cursor());
                }
                ctx.composition.confirm_all();
                ctx.commit_text();
                ProcessResult::Accepted
            }
            KeyEvent::Escape => {
                ctx.clear();
                ProcessResult::Accepted
            }
            _ => ProcessResult::Rejected,
        }
    }
}

/// Direct-commits a mapped full-width punctuation mark when not composing.
pub struct PunctuatorProcessor;

fn punct_mapping(ch: char) -> Option<&'static str> {
    Some(match ch {
        '.' => "。",
        ',' => "，",
        '?' => "？",
        '!' => "！",
        ':' => "：",
        ';' => "；",
        '(' => "（",
        ')' => "）",
        '\\' => "、",
        _ => return None,
    })
}

impl Processor for PunctuatorProcessor {
    fn name(&self) -> &str {
        "punctuator_processor"
    }

    fn process(&self, ctx: &mut Context, key: KeyEvent) -> ProcessResult {
        if ctx.is_composing() {
            return ProcessResult::Rejected;
        }
        let KeyEvent::Char(ch) = key else {
            return ProcessResult::Rejected;
        };
        match punct_mapping(ch) {
            Some(mapped) => {
                ctx.notify(NotifierEvent::Commit { text: mapped.to_string() });
                ProcessResult::Accepted
            }
            None => ProcessResult::Rejected,
        }
    }
}

/// Toggled on by `KeyEvent::ToggleAsciiMode`; while on, every printable
/// character commits straight through untranslated (spec.md §4.3's ascii
/// composer, the "raw latin passthrough" mode).
pub struct AsciiComposerProcessor;

impl Processor for AsciiComposerProcessor {
    fn name(&self) -> &str {
        "ascii_composer_processor"
    }

    fn process(&self, ctx: &mut Context, key: KeyEvent) -> ProcessResult {
        if key == KeyEvent::ToggleAsciiMode {
            ctx.ascii_mode = !ctx.ascii_mode;
            return ProcessResult::Accepted;
        }
        if !ctx.ascii_mode {
            return ProcessResult::Rejected;
        }
        if let KeyEvent::Char(ch) = key {
            ctx.notify(NotifierEvent::Commit { text: ch.to_string() });
            ProcessResult::Accepted
        } else {
            ProcessResult::Rejected
        }
    }
}

/// Toggled on by `KeyEvent::ToggleFullShape`; while on and not composing,
/// commits the full-width form of a typed character directly.
pub struct ShapeProcessor;

impl Processor for ShapeProcessor {
    fn name(&self) -> &str {
        "shape_processor"
    }

    fn process(&self, ctx: &mut Context, key: KeyEvent) -> ProcessResult {
        if key == KeyEvent::ToggleFullShape {
            ctx.full_shape = !ctx.full_shape;
            return ProcessResult::Accepted;
        }
        if !ctx.full_shape || ctx.is_composing() {
            return ProcessResult::Rejected;
        }
        if let KeyEvent::Char(ch) = key {
            let wide = crate::utils::to_fullwidth(&ch.to_string());
            ctx.notify(NotifierEvent::Commit { text: wide });
            ProcessResult::Accepted
        } else {
            ProcessResult::Rejected
        }
    }
}

// ---------------------------------------------------------------------
// Filters (spec.md §4.9)
// ---------------------------------------------------------------------

/// Drops candidates whose display text already appeared earlier in the
/// stream (`merge` already uniquifies identical `(text, start, end)`
/// triples; this collapses same-text candidates from different sources,
/// e.g. a dictionary entry and a sentence candidate agreeing on one word).
pub struct UniquifierFilter;

impl Filter for UniquifierFilter {
    fn name(&self) -> &str {
        "uniquifier_filter"
    }

    fn filter(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let mut seen = HashSet::new();
        candidates.into_iter().filter(|c| seen.insert(c.text.clone())).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleCharMode {
    /// Move single-character candidates to the front, keep everything else.
    CharFirst,
    /// Drop every multi-character candidate.
    CharOnly,
}

/// Prioritizes single-character candidates (spec.md §4.9's single-char
/// preference some schemas enable for faster phrase building).
pub struct SingleCharFilter(pub SingleCharMode);

impl Filter for SingleCharFilter {
    fn name(&self) -> &str {
        "single_char_filter"
    }

    fn filter(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        match self.0 {
            SingleCharMode::CharOnly => {
                candidates.into_iter().filter(|c| c.text.chars().count() == 1).collect()
            }
            SingleCharMode::CharFirst => {
                let mut out = candidates;
                out.sort_by_key(|c| c.text.chars().count() != 1);
                out
            }
        }
    }
}

/// Caps the candidate stream at a maximum length, preserving order. A
/// simplified stand-in for the original's variant-trimming minifier: instead
/// of collapsing near-duplicate glyph variants it bounds how many candidates
/// a very ambiguous segment can produce.
pub struct CjkMinifierFilter {
    pub max_candidates: usize,
}

impl Filter for CjkMinifierFilter {
    fn name(&self) -> &str {
        "cjk_minifier_filter"
    }

    fn filter(&self, mut candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.truncate(self.max_candidates);
        candidates
    }
}

/// Structural passthrough: simplified/traditional conversion (OpenCC) is a
/// Non-goal, but the filter stage itself still exists in the pipeline so a
/// schema can drop in a real implementation without touching `Engine`.
pub struct SimplifierFilter;

impl Filter for SimplifierFilter {
    fn name(&self) -> &str {
        "simplifier_filter"
    }

    fn filter(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates
    }
}
