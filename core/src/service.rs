//! [`Service`]: the external entry point managing many sessions against one
//! shared [`Engine`] (spec.md §5/§6).
//!
//! Grounded on the teacher's `ImeEngine` session/context wiring, generalized
//! from "one engine, one session" to a session-id-keyed map behind a single
//! coarse `Mutex`, per spec.md §5 ("no per-key suspension points, one mutex
//! guards the session map").

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::candidate::Candidate;
use crate::context::ContextSnapshot;
use crate::engine::Engine;
use crate::pipeline::{KeyEvent, ProcessResult};
use crate::session::Session;

pub type SessionId = u64;

/// Host-facing view of a session's mode flags (spec.md §6's `get_status`).
#[derive(Debug, Clone)]
pub struct Status {
    pub schema_id: String,
    pub schema_name: String,
    pub is_disabled: bool,
    pub is_ascii_mode: bool,
    pub is_simplified: bool,
    pub is_composing: bool,
    pub is_full_shape: bool,
    pub is_traditional: bool,
}

struct Inner {
    engine: Arc<Engine>,
    sessions: HashMap<SessionId, Session>,
    next_id: SessionId,
}

#[derive(Clone)]
pub struct Service {
    inner: Arc<Mutex<Inner>>,
}

impl Service {
    pub fn initialize(engine: Arc<Engine>) -> Self {
        Service {
            inner: Arc::new(Mutex::new(Inner {
                engine,
                sessions: HashMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Tear down every session. Mirrors `initialize` as the service's
    /// lifecycle bookend (spec.md §6), for a host shutting the IME down.
    pub fn finalize(&self) {
        self.inner.lock().unwrap().sessions.clear();
    }

    pub fn create_session(&self) -> SessionId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        let page_size = inner.engine.config.borrow().page_size;
        let mut session = Session::new(page_size);
        session.activate();
        inner.sessions.insert(id, session);
        id
    }

    pub fn destroy_session(&self, id: SessionId) {
        self.inner.lock().unwrap().sessions.remove(&id);
    }

    /// Remove every session idle longer than the configured timeout
    /// (spec.md §6), returning how many were reclaimed.
    pub fn cleanup_stale_sessions(&self) -> usize {
        let mut inner = self.inner.lock().unwrap();
        let timeout = Duration::from_secs(inner.engine.config.borrow().session_idle_timeout_secs);
        let before = inner.sessions.len();
        inner.sessions.retain(|_, session| session.idle_for() < timeout);
        before - inner.sessions.len()
    }

    pub fn cleanup_all_sessions(&self) {
        self.inner.lock().unwrap().sessions.clear();
    }

    pub fn process_key(&self, id: SessionId, key: KeyEvent) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let engine = inner.engine.clone();
        let Some(session) = inner.sessions.get_mut(&id) else {
            return false;
        };
        session.touch();
        let mut result = engine.process_key(&mut session.context, key);
        if result == ProcessResult::Rejected {
            result = default_process(&mut session.context, key);
            if result != ProcessResult::Rejected {
                engine.resegment(&mut session.context);
                engine.refresh_menu(&mut session.context);
            }
        }
        matches!(result, ProcessResult::Accepted | ProcessResult::Noop)
    }

    pub fn get_context(&self, id: SessionId) -> ContextSnapshot {
        let inner = self.inner.lock().unwrap();
        let mut snapshot = ContextSnapshot::default();
        if let Some(session) = inner.sessions.get(&id) {
            session.sync_to_snapshot(&mut snapshot);
        }
        snapshot
    }

    pub fn select_candidate(&self, id: SessionId, page_index: usize) -> Option<Candidate> {
        let mut inner = self.inner.lock().unwrap();
        let engine = inner.engine.clone();
        let session = inner.sessions.get_mut(&id)?;
        session.touch();
        let candidate = session.context.menu.current_page_candidates().get(page_index)?.clone();
        session.context.select(page_index);
        session.context.confirm_current_selection();
        engine.finalize_pending_commit(&mut session.context);
        Some(candidate)
    }

    /// Highlight (move the cursor to) a candidate without confirming it —
    /// the mouse-hover/arrow-preview case spec.md §6 distinguishes from an
    /// actual selection.
    pub fn highlight_candidate(&self, id: SessionId, page_index: usize) -> Option<Candidate> {
        let mut inner = self.inner.lock().unwrap();
        let session = inner.sessions.get_mut(&id)?;
        session.touch();
        let candidate = session.context.menu.select_by_index(page_index)?.clone();
        session.context.notify(crate::context::NotifierEvent::Update);
        Some(candidate)
    }

    pub fn commit_composition(&self, id: SessionId) -> Option<String> {
        let mut inner = self.inner.lock().unwrap();
        let engine = inner.engine.clone();
        let session = inner.sessions.get_mut(&id)?;
        session.touch();
        if !session.context.is_composing() {
            return None;
        }
        let text = session.context.commit_text();
        engine.finalize_pending_commit(&mut session.context);
        Some(text)
    }

    pub fn clear_composition(&self, id: SessionId) {
        if let Some(session) = self.inner.lock().unwrap().sessions.get_mut(&id) {
            session.clear();
        }
    }

    /// One-shot read of the most recently committed text, clearing it so a
    /// host polling loop never replays the same commit twice (spec.md §6).
    pub fn get_commit(&self, id: SessionId) -> Option<String> {
        let mut inner = self.inner.lock().unwrap();
        let session = inner.sessions.get_mut(&id)?;
        session.context.last_commit.take().map(|(_, text)| text)
    }

    pub fn get_status(&self, id: SessionId) -> Option<Status> {
        let inner = self.inner.lock().unwrap();
        let session = inner.sessions.get(&id)?;
        let cfg = inner.engine.config.borrow();
        Some(Status {
            schema_id: cfg.schema_id.clone(),
            schema_name: cfg.schema_name.clone(),
            is_disabled: !session.is_active(),
            is_ascii_mode: session.context.ascii_mode,
            // The simplifier filter is a structural passthrough (OpenCC
            // conversion is a Non-goal), so output is always the dictionary's
            // native script.
            is_simplified: true,
            is_composing: session.context.is_composing(),
            is_full_shape: session.context.full_shape,
            is_traditional: false,
        })
    }

    /// Parse and apply a key sequence string (spec.md §6's
    /// `{Modifier+Name}`/printable grammar). Unparseable input yields an
    /// empty sequence and no state change, exactly as spec.md §6 specifies.
    pub fn simulate_key_sequence(&self, id: SessionId, sequence: &str) {
        for key in parse_key_sequence(sequence) {
            self.process_key(id, key);
        }
    }
}

/// Handles the handful of key events every schema needs regardless of its
/// registered processors (character insertion, backspace, escape) — the
/// schema's own processors still get first refusal via `Engine::process_key`.
/// This is the pipeline's last resort: "rejected by every processor" keys
/// still have to go somewhere, and a raw key commits raw (spec.md §4.2).
fn default_process(ctx: &mut crate::context::Context, key: KeyEvent) -> ProcessResult {
    match key {
        KeyEvent::Char(ch) => {
            ctx.push_input(ch);
            ProcessResult::Accepted
        }
        KeyEvent::Backspace => {
            if ctx.pop_input() {
                ProcessResult::Accepted
            } else {
                ProcessResult::Noop
            }
        }
        KeyEvent::Escape => {
            ctx.clear();
            ProcessResult::Accepted
        }
        _ => ProcessResult::Rejected,
    }
}

fn parse_key_sequence(sequence: &str) -> Vec<KeyEvent> {
    let mut out = Vec::new();
    let mut chars = sequence.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '{' {
            let mut name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                name.push(c);
            }
            if !closed {
                return Vec::new();
            }
            match name.as_str() {
                "Backspace" => out.push(KeyEvent::Backspace),
                "Delete" => out.push(KeyEvent::Delete),
                "Left" => out.push(KeyEvent::Left),
                "Right" => out.push(KeyEvent::Right),
                "Home" => out.push(KeyEvent::Home),
                "End" => out.push(KeyEvent::End),
                "Up" => out.push(KeyEvent::Up),
                "Down" => out.push(KeyEvent::Down),
                "PageUp" => out.push(KeyEvent::PageUp),
                "PageDown" => out.push(KeyEvent::PageDown),
                "Enter" => out.push(KeyEvent::Enter),
                "Escape" => out.push(KeyEvent::Escape),
                "Space" => out.push(KeyEvent::Space),
                "Tab" => out.push(KeyEvent::Tab),
                "ToggleAsciiMode" => out.push(KeyEvent::ToggleAsciiMode),
                "ToggleFullShape" => out.push(KeyEvent::ToggleFullShape),
                _ => return Vec::new(),
            }
        } else if ch.is_ascii_digit() {
            out.push(KeyEvent::Number(ch as u8 - b'0'));
        } else {
            out.push(KeyEvent::Char(ch));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_literal_and_named_keys() {
        let keys = parse_key_sequence("ni{Down}{Enter}");
        assert_eq!(
            keys,
            vec![
                KeyEvent::Char('n'),
                KeyEvent::Char('i'),
                KeyEvent::Down,
                KeyEvent::Enter,
            ]
        );
    }

    #[test]
    fn unterminated_brace_yields_empty_sequence() {
        assert!(parse_key_sequence("a{Down").is_empty());
    }

    #[test]
    fn unknown_key_name_yields_empty_sequence() {
        assert!(parse_key_sequence("{Nope}").is_empty());
    }
}
