//! Per-client [`Session`]: owns one [`Context`], tracks which mode the
//! pipeline is currently routed through and when it was last touched.
//!
//! Adapted from the teacher's `ImeSession`/`sync_to_context` pair:
//! `InputBuffer`+`Composition`+`CandidateList` are replaced by `Context`
//! (which now owns its composition *and* its menu — moved here from
//! `Session` so a `Processor` acting only on `&mut Context` can select and
//! confirm candidates itself); `sync_to_context` becomes `sync_to_snapshot`,
//! generalized to read from the new `ContextSnapshot` shape.

use std::time::{Duration, Instant};

use crate::context::{Context, ContextSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Init,
    Composing,
    Suggestion,
    Passthrough,
}

pub struct Session {
    pub context: Context,
    pub mode: InputMode,
    active: bool,
    last_active: Instant,
}

impl Session {
    pub fn new(page_size: usize) -> Self {
        Session {
            context: Context::with_page_size(page_size),
            mode: InputMode::Init,
            active: false,
            last_active: Instant::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Record that the host just interacted with this session (spec.md §6's
    /// idle-timeout cleanup uses this to decide which sessions are stale).
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }

    pub fn clear(&mut self) {
        self.context.clear();
        self.mode = InputMode::Init;
        self.active = false;
    }

    /// Populate a read-only [`ContextSnapshot`] for the platform to render,
    /// mirroring the teacher's `sync_to_context`.
    pub fn sync_to_snapshot(&self, snapshot: &mut ContextSnapshot) {
        snapshot.clear();
        let preedit = self.context.composition.preedit_text();
        if !preedit.is_empty() {
            snapshot.preedit_text = preedit;
            snapshot.preedit_cursor = self.context.cursor;
        }
        let menu = &self.context.menu;
        let page = menu.current_page_candidates();
        snapshot.candidates = page.iter().map(|c| c.text.clone()).collect();
        snapshot.candidate_cursor = menu.cursor();
        if menu.num_pages() > 1 {
            snapshot.auxiliary_text = format!("{}/{}", menu.current_page() + 1, menu.num_pages());
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_resets_mode_and_active_flag() {
        let mut session = Session::new(5);
        session.activate();
        session.mode = InputMode::Composing;
        session.clear();
        assert!(!session.is_active());
        assert_eq!(session.mode, InputMode::Init);
    }

    #[test]
    fn touch_resets_idle_duration() {
        let mut session = Session::new(5);
        session.touch();
        assert!(session.idle_for() < Duration::from_secs(1));
    }
}
