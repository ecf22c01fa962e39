//! Candidates and the paginated [`Menu`] that merges translator output.
//!
//! `Candidate` generalizes the teacher's flat `{text, score}` pair into the
//! tagged variants spec.md §3/§4.9 names (simple / shadow / uniquified /
//! phrase / sentence); `Menu`'s pagination API (`cursor_up`/`page_down`/
//! `select_by_index`/...) is carried over verbatim from the teacher's
//! `CandidateList`, just rebound to the new `Candidate` type, since the
//! cursor/page bookkeeping itself doesn't change with the domain.

use std::ops::Range;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CandidateKind {
    /// A single dictionary entry for one segment.
    Simple,
    /// Stands in for another candidate in the menu (e.g. a masked phrase's
    /// placeholder), carrying the index of the candidate it shadows.
    Shadow { of: usize },
    /// A duplicate-by-text candidate collapsed into one slot.
    Uniquified { folded: usize },
    /// A multi-syllable dictionary phrase spanning more than one segment.
    Phrase,
    /// A full-sentence candidate produced by the poet.
    Sentence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub quality: f32,
    pub kind: CandidateKind,
    pub comment: Option<String>,
}

impl Candidate {
    pub fn simple<T: Into<String>>(text: T, start: usize, end: usize, quality: f32) -> Self {
        Candidate {
            text: text.into(),
            start,
            end,
            quality,
            kind: CandidateKind::Simple,
            comment: None,
        }
    }

    pub fn span_len(&self) -> usize {
        self.end - self.start
    }
}

/// Menu ordering (spec.md §4.9): smaller start first, then larger end
/// (longer spans sort before shorter ones starting at the same place), then
/// higher quality.
pub fn compare(a: &Candidate, b: &Candidate) -> std::cmp::Ordering {
    a.start
        .cmp(&b.start)
        .then_with(|| b.end.cmp(&a.end))
        .then_with(|| b.quality.partial_cmp(&a.quality).unwrap_or(std::cmp::Ordering::Equal))
}

/// Merge candidate streams from multiple translators into one ordered,
/// uniquified list (spec.md §4.9).
pub fn merge(streams: Vec<Vec<Candidate>>) -> Vec<Candidate> {
    let mut all: Vec<Candidate> = streams.into_iter().flatten().collect();
    all.sort_by(compare);
    let mut seen: std::collections::HashSet<(String, usize, usize)> = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(all.len());
    for mut cand in all {
        let key = (cand.text.clone(), cand.start, cand.end);
        if !seen.insert(key) {
            let folded = out.len().saturating_sub(1);
            cand.kind = CandidateKind::Uniquified { folded };
            continue;
        }
        out.push(cand);
    }
    out
}

/// A paginated, navigable view over a merged candidate list.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    candidates: Vec<Candidate>,
    page_size: usize,
    current_page: usize,
    cursor: usize,
}

impl Menu {
    pub fn new() -> Self {
        Menu {
            candidates: Vec::new(),
            page_size: 5,
            current_page: 0,
            cursor: 0,
        }
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Menu {
            page_size: page_size.max(1),
            ..Menu::new()
        }
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        if self.current_page >= self.num_pages() && self.num_pages() > 0 {
            self.current_page = 0;
        }
        if self.cursor >= self.current_page_len() && self.current_page_len() > 0 {
            self.cursor = 0;
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_candidates(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates;
        self.current_page = 0;
        self.cursor = 0;
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn num_pages(&self) -> usize {
        if self.candidates.is_empty() {
            0
        } else {
            self.candidates.len().div_ceil(self.page_size)
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn current_page_len(&self) -> usize {
        let start = self.current_page * self.page_size;
        let end = (start + self.page_size).min(self.candidates.len());
        end.saturating_sub(start)
    }

    fn current_page_range(&self) -> Range<usize> {
        let start = self.current_page * self.page_size;
        let end = (start + self.page_size).min(self.candidates.len());
        start..end
    }

    pub fn current_page_candidates(&self) -> &[Candidate] {
        if self.candidates.is_empty() {
            return &[];
        }
        &self.candidates[self.current_page_range()]
    }

    pub fn selected_candidate(&self) -> Option<&Candidate> {
        self.current_page_candidates().get(self.cursor)
    }

    pub fn selected_index(&self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let idx = self.current_page * self.page_size + self.cursor;
        (idx < self.candidates.len()).then_some(idx)
    }

    pub fn cursor_up(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    pub fn cursor_down(&mut self) -> bool {
        let page_len = self.current_page_len();
        if page_len > 0 && self.cursor < page_len - 1 {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    pub fn page_up(&mut self) -> bool {
        if self.current_page > 0 {
            self.current_page -= 1;
            let page_len = self.current_page_len();
            if page_len > 0 && self.cursor >= page_len {
                self.cursor = page_len - 1;
            }
            true
        } else {
            false
        }
    }

    pub fn page_down(&mut self) -> bool {
        let num_pages = self.num_pages();
        if num_pages > 0 && self.current_page < num_pages - 1 {
            self.current_page += 1;
            let page_len = self.current_page_len();
            if page_len > 0 && self.cursor >= page_len {
                self.cursor = page_len - 1;
            }
            true
        } else {
            false
        }
    }

    pub fn select_by_index(&mut self, page_index: usize) -> Option<&Candidate> {
        if page_index < self.current_page_len() {
            self.cursor = page_index;
            self.selected_candidate()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
        self.current_page = 0;
        self.cursor = 0;
    }

    pub fn reset(&mut self) {
        self.current_page = 0;
        self.cursor = 0;
    }
}
