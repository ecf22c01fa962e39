//! Composition: per-segment selection state over the raw input buffer.
//!
//! Adapted from the teacher's `Composition`/`Segment` (a flat preedit string
//! with byte-range segments) to spec.md §3/§4.2's richer model: each segment
//! spans a `(start, end)` range over *syllable graph positions*, not preedit
//! bytes, and carries a [`Manner`] — open (still being composed), guessed
//! (an unconfirmed translator default), selected (user picked a candidate),
//! or confirmed (locked in and no longer re-translated) — mirroring
//! `examples/original_source/include/rime/composition.h`'s `Selection`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manner {
    Open,
    Guessed,
    Selected,
    Confirmed,
}

/// One segment of the composition: a span over the syllable graph plus which
/// candidate (if any) currently fills it.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub manner: Manner,
    /// Index into this segment's menu of the currently displayed/selected
    /// candidate.
    pub selected_index: usize,
    /// Display text for this segment (the selected candidate's text, or the
    /// raw input if still `Open`).
    pub text: String,
}

impl Segment {
    pub fn open(start: usize, end: usize, text: String) -> Self {
        Segment {
            start,
            end,
            manner: Manner::Open,
            selected_index: 0,
            text,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// The full composition: an ordered run of segments covering `[0,
/// input_length)`, plus the cursor over the raw input buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composition {
    pub segments: Vec<Segment>,
    pub cursor: usize,
}

impl Composition {
    pub fn new() -> Self {
        Composition::default()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.cursor = 0;
    }

    /// Rendered preedit text: concatenation of every segment's display text.
    pub fn preedit_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn segment_at(&self, graph_pos: usize) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|seg| seg.start <= graph_pos && graph_pos < seg.end)
    }

    pub fn segment_at_mut(&mut self, graph_pos: usize) -> Option<&mut Segment> {
        self.segments
            .iter_mut()
            .find(|seg| seg.start <= graph_pos && graph_pos < seg.end)
    }

    /// Confirm every segment, locking the composition prior to commit.
    pub fn confirm_all(&mut self) {
        for seg in &mut self.segments {
            seg.manner = Manner::Confirmed;
        }
    }

    pub fn has_unconfirmed(&self) -> bool {
        self.segments.iter().any(|s| s.manner != Manner::Confirmed)
    }

    /// The segment the pipeline is still actively composing: the last one
    /// that hasn't been confirmed yet. `None` once every segment is locked.
    pub fn active_segment(&self) -> Option<&Segment> {
        self.segments.iter().rev().find(|s| s.manner != Manner::Confirmed)
    }

    pub fn active_segment_mut(&mut self) -> Option<&mut Segment> {
        self.segments.iter_mut().rev().find(|s| s.manner != Manner::Confirmed)
    }

    pub fn is_fully_confirmed(&self) -> bool {
        !self.segments.is_empty() && self.segments.iter().all(|s| s.manner == Manner::Confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preedit_text_concatenates_segments() {
        let mut comp = Composition::new();
        comp.segments.push(Segment::open(0, 2, "你好".into()));
        comp.segments.push(Segment::open(2, 4, "吗".into()));
        assert_eq!(comp.preedit_text(), "你好吗");
    }

    #[test]
    fn confirm_all_locks_every_segment() {
        let mut comp = Composition::new();
        comp.segments.push(Segment::open(0, 2, "你好".into()));
        comp.confirm_all();
        assert!(!comp.has_unconfirmed());
    }
}
