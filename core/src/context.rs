//! Engine-internal [`Context`]: raw input, composition, and notifiers.
//!
//! Adapted from the teacher's `ImeContext` "zero abstraction" data-transfer
//! struct, split into two roles per spec.md §4.1: `Context` is the
//! pipeline's working state (mutated by processors/segmentors/translators),
//! while [`ContextSnapshot`] is the read-only projection external callers
//! see — renamed from `ImeContext` but keeping its flat, field-public shape,
//! since platform code reading fields directly (no callbacks) is exactly
//! what spec.md §6 wants at that boundary.
//!
//! Notifiers follow spec.md §4.1/§9's "single-writer broadcast channels
//! keyed by event type", grounded conceptually on
//! `examples/original_source/include/rime/context.h`'s signal/slot
//! `CommitNotifier`.

use crate::candidate::Menu;
use crate::composition::{Composition, Manner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputPurpose {
    #[default]
    FreeForm,
    Email,
    Url,
    Password,
    Number,
    Phone,
    Terminal,
}

#[derive(Debug, Clone)]
pub enum NotifierEvent {
    Update,
    Select { index: usize },
    Commit { text: String },
    DeleteCandidate { index: usize },
}

type Subscriber = Box<dyn FnMut(&NotifierEvent) + Send>;

/// Pipeline working state: the raw input buffer plus the composition built
/// from it so far.
pub struct Context {
    pub input: String,
    pub cursor: usize,
    pub composition: Composition,
    /// The active segment's candidates (moved here from `Session` so a
    /// `Processor`, which only ever sees `&mut Context`, can select/confirm
    /// candidates itself rather than reaching into session state it can't
    /// see).
    pub menu: Menu,
    /// Whether ascii-passthrough mode is toggled on (`AsciiComposerProcessor`).
    pub ascii_mode: bool,
    /// Whether full-shape (full-width) direct commit is toggled on
    /// (`ShapeProcessor`).
    pub full_shape: bool,
    /// `(input, commit text)` of the most recent commit, kept around so a
    /// Backspace within the revert window can undo it (spec.md §4.7/§8 S5).
    /// Cleared the moment new input starts.
    pub last_commit: Option<(String, String)>,
    /// Set by `commit_text`, consumed by `Engine` to learn the commit into
    /// the user dictionary exactly once.
    pub(crate) pending_learn: bool,
    subscribers: Vec<Subscriber>,
}

impl Context {
    pub fn new() -> Self {
        Context::with_page_size(5)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Context {
            input: String::new(),
            cursor: 0,
            composition: Composition::new(),
            menu: Menu::with_page_size(page_size),
            ascii_mode: false,
            full_shape: false,
            last_commit: None,
            pending_learn: false,
            subscribers: Vec::new(),
        }
    }

    pub fn is_composing(&self) -> bool {
        !self.input.is_empty()
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
        self.composition.clear();
        self.menu.clear();
    }

    pub fn push_input(&mut self, ch: char) {
        self.last_commit = None;
        self.input.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
        self.notify(NotifierEvent::Update);
    }

    pub fn pop_input(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = self.input[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.input.drain(prev..self.cursor);
        self.cursor = prev;
        self.notify(NotifierEvent::Update);
        true
    }

    /// Subscribe to context events. Unsubscribing during delivery is safe:
    /// `notify` copies nothing, it simply holds the lock for the duration of
    /// delivery, and subscribers are appended only outside of `notify`.
    pub fn subscribe<F: FnMut(&NotifierEvent) + Send + 'static>(&mut self, f: F) {
        self.subscribers.push(Box::new(f));
    }

    pub fn notify(&mut self, event: NotifierEvent) {
        for sub in &mut self.subscribers {
            sub(&event);
        }
    }

    pub fn commit_text(&mut self) -> String {
        let text = self.composition.preedit_text();
        self.last_commit = Some((self.input.clone(), text.clone()));
        self.pending_learn = true;
        self.notify(NotifierEvent::Commit { text: text.clone() });
        self.clear();
        text
    }

    /// Fill the active segment with the menu candidate at `page_index`
    /// (spec.md §4.3's selector processor contract). Returns `false` if
    /// there is no such candidate or no segment left to fill.
    pub fn select(&mut self, page_index: usize) -> bool {
        let Some(candidate) = self.menu.select_by_index(page_index).cloned() else {
            return false;
        };
        let Some(seg) = self.composition.active_segment_mut() else {
            return false;
        };
        seg.manner = Manner::Selected;
        seg.text = candidate.text;
        seg.selected_index = page_index;
        self.notify(NotifierEvent::Select { index: page_index });
        self.notify(NotifierEvent::Update);
        true
    }

    /// Confirm the active segment. If that was the last unconfirmed segment,
    /// commits the whole composition and returns the committed text.
    pub fn confirm_current_selection(&mut self) -> Option<String> {
        let seg = self.composition.active_segment_mut()?;
        seg.manner = Manner::Confirmed;
        if self.composition.is_fully_confirmed() {
            Some(self.commit_text())
        } else {
            self.menu.clear();
            self.notify(NotifierEvent::Update);
            None
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only snapshot of engine state for platform/UI consumption
/// (spec.md §6's "abstracted from the C ABI" external interface).
#[derive(Debug, Clone, Default)]
pub struct ContextSnapshot {
    pub preedit_text: String,
    pub preedit_cursor: usize,
    pub commit_text: String,
    pub candidates: Vec<String>,
    pub candidate_cursor: usize,
    pub auxiliary_text: String,
    pub input_purpose: InputPurpose,
}

impl ContextSnapshot {
    pub fn clear(&mut self) {
        self.preedit_text.clear();
        self.preedit_cursor = 0;
        self.candidates.clear();
        self.candidate_cursor = 0;
        self.auxiliary_text.clear();
    }

    pub fn take_commit(&mut self) -> String {
        std::mem::take(&mut self.commit_text)
    }

    pub fn has_visible_state(&self) -> bool {
        !self.preedit_text.is_empty() || !self.candidates.is_empty()
    }

    pub fn has_commit(&self) -> bool {
        !self.commit_text.is_empty()
    }
}
