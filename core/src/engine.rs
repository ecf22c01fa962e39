//! [`Engine`]: the pipeline orchestrator tying syllabification, dictionary
//! lookup, the poet, and the registered processor/segmentor/translator/
//! filter stages into one `process_key` entry point (spec.md §2/§4).
//!
//! Grounded on the teacher's `ImeEngine` (session+context synchronization,
//! `KeyEvent`/`KeyResult` shape) and `Engine::input`'s cache-then-compute
//! flow (`core/src/engine.rs`/`core/src/ime_engine.rs`), generalized from a
//! single backend-bound struct to one that holds schema-registered stage
//! lists instead of three hardcoded editors, and from whole-input
//! translation to per-segment translation driven by `Composition`
//! (spec.md §4.2 step 2's "rebuild segmentation, then translate each
//! segment").

use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tracing::{debug, error};

use crate::candidate::{self, Candidate, CandidateKind, Menu};
use crate::composition::{Manner, Segment};
use crate::config::Config;
use crate::context::{Context, NotifierEvent};
use crate::dictionary::Dictionary;
use crate::fuzzy::FuzzyMap;
use crate::pipeline::{Filter, KeyEvent, ProcessResult, Processor, Segmentor, Translator};
use crate::poet::{Poet, WordGraph};
use crate::syllabifier::{SyllableGraph, Syllabifier};
use crate::userdict::UserDb;

pub struct Engine {
    pub dictionary: Arc<Dictionary>,
    pub fuzzy: FuzzyMap,
    pub userdict: Option<Arc<UserDb>>,
    pub config: RefCell<Config>,
    processors: Vec<Box<dyn Processor>>,
    segmentors: Vec<Box<dyn Segmentor>>,
    translators: Vec<Box<dyn Translator>>,
    filters: Vec<Box<dyn Filter>>,
    poet: Poet,
    cache: RefCell<LruCache<String, Vec<Candidate>>>,
}

impl Engine {
    pub fn new(dictionary: Arc<Dictionary>, fuzzy: FuzzyMap, config: Config) -> Self {
        let cache_cap = NonZeroUsize::new(config.candidate_cache_size.max(1)).unwrap();
        Engine {
            poet: Poet::new(config.max_homophones_in_mind, config.sentence_penalty),
            dictionary,
            fuzzy,
            userdict: None,
            config: RefCell::new(config),
            processors: Vec::new(),
            segmentors: Vec::new(),
            translators: Vec::new(),
            filters: Vec::new(),
            cache: RefCell::new(LruCache::new(cache_cap)),
        }
    }

    pub fn with_userdict(mut self, db: Arc<UserDb>) -> Self {
        self.userdict = Some(db);
        self
    }

    pub fn register_processor(&mut self, p: Box<dyn Processor>) {
        self.processors.push(p);
    }

    pub fn register_segmentor(&mut self, s: Box<dyn Segmentor>) {
        self.segmentors.push(s);
    }

    pub fn register_translator(&mut self, t: Box<dyn Translator>) {
        self.translators.push(t);
    }

    pub fn register_filter(&mut self, f: Box<dyn Filter>) {
        self.filters.push(f);
    }

    /// Run every registered processor in order until one accepts the key
    /// (spec.md §4.2 step 1: "offer the key to each processor in
    /// registration order"), then rebuild segmentation and the active
    /// segment's menu if anything changed. A Backspace immediately after a
    /// commit, within the configured revert window, undoes that commit
    /// instead of reaching the processor chain at all (spec.md §4.7/§8 S5).
    pub fn process_key(&self, ctx: &mut Context, key: KeyEvent) -> ProcessResult {
        if key == KeyEvent::Backspace {
            if let Some(result) = self.try_revert_commit(ctx) {
                return result;
            }
        }

        let input_before = ctx.input.clone();
        let mut result = ProcessResult::Rejected;
        for proc in &self.processors {
            match proc.process(ctx, key) {
                ProcessResult::Rejected => continue,
                r => {
                    debug!(processor = proc.name(), ?r, "processed key");
                    result = r;
                    break;
                }
            }
        }

        if result != ProcessResult::Rejected {
            if ctx.input != input_before {
                self.resegment(ctx);
            }
            self.refresh_menu(ctx);
            self.finalize_pending_commit(ctx);
        }
        result
    }

    fn try_revert_commit(&self, ctx: &mut Context) -> Option<ProcessResult> {
        if ctx.is_composing() {
            return None;
        }
        let (input, _text) = ctx.last_commit.clone()?;
        let db = self.userdict.as_ref()?;
        match db.revert_recent() {
            Ok(true) => {
                ctx.last_commit = None;
                ctx.input = input;
                ctx.cursor = ctx.input.len();
                self.resegment(ctx);
                self.refresh_menu(ctx);
                ctx.notify(NotifierEvent::Update);
                Some(ProcessResult::Accepted)
            }
            Ok(false) => None,
            Err(e) => {
                error!(error = %e, "failed to check revertible commit");
                None
            }
        }
    }

    /// Rebuild `ctx.composition` from the raw input by walking it left to
    /// right and asking each registered segmentor, in order, whether it
    /// claims the run starting at the current position (spec.md §4.2 step 2,
    /// §4.4). A segment whose `(start, end)` survives unchanged and was
    /// already `Confirmed` is preserved rather than reopened, so confirming
    /// an earlier segment sticks across further keystrokes.
    pub fn resegment(&self, ctx: &mut Context) {
        let chars: Vec<char> = ctx.input.chars().collect();
        if chars.is_empty() {
            ctx.composition.clear();
            return;
        }

        let previous = std::mem::take(&mut ctx.composition.segments);
        let mut segments = Vec::with_capacity(previous.len());
        let mut pos = 0;
        while pos < chars.len() {
            let end = self
                .segmentors
                .iter()
                .find_map(|s| s.segment(&chars, pos))
                .unwrap_or(chars.len())
                .clamp(pos + 1, chars.len());

            let seg = previous
                .iter()
                .find(|s| s.start == pos && s.end == end && s.manner == Manner::Confirmed)
                .cloned()
                .unwrap_or_else(|| {
                    let text: String = chars[pos..end].iter().collect();
                    Segment::open(pos, end, text)
                });
            pos = end;
            segments.push(seg);
        }
        ctx.composition.segments = segments;
    }

    /// Recompute the active segment's menu: find the last unconfirmed
    /// segment, syllabify and translate just its substring, merge and
    /// filter the results, then offset them back into composition-global
    /// coordinates (spec.md §4.6/§4.9). Earlier, confirmed segments are
    /// left untouched — this is what keeps translation scoped to
    /// `Composition`/`Segment`/`Segmentation` instead of the whole input.
    pub fn refresh_menu(&self, ctx: &mut Context) {
        let page_size = self.config.borrow().page_size;
        let Some(segment) = ctx.composition.active_segment() else {
            ctx.menu = Menu::with_page_size(page_size);
            return;
        };
        let (start, end) = (segment.start, segment.end);
        let chars: Vec<char> = ctx.input.chars().collect();
        let span: String = chars[start..end].iter().collect();
        if span.is_empty() {
            ctx.menu = Menu::with_page_size(page_size);
            return;
        }

        let local = self.translate_span(&span);

        let mut menu = Menu::with_page_size(page_size);
        let offset: Vec<Candidate> = local
            .into_iter()
            .map(|mut c| {
                c.start += start;
                c.end += start;
                c
            })
            .collect();
        menu.set_candidates(offset);
        ctx.menu = menu;
        ctx.notify(NotifierEvent::Update);
    }

    /// Translate one segment-local substring into a merged, filtered
    /// candidate list, consulting and populating the LRU cache keyed by
    /// that substring alone (cache entries are shared across segments and
    /// sessions that happen to type the same syllables).
    fn translate_span(&self, span: &str) -> Vec<Candidate> {
        if let Some(hit) = self.cache.borrow_mut().get(span) {
            return hit.clone();
        }

        let fuzzy_enabled = self.config.borrow().fuzzy_enabled;
        let syllabifier = Syllabifier::new(&self.dictionary.prism, &self.fuzzy, fuzzy_enabled);
        let graph = syllabifier.build(span);

        let mut streams = Vec::new();
        for translator in &self.translators {
            if let Some(cands) = translator.translate(span, &graph) {
                streams.push(cands);
            }
        }
        streams.push(self.dictionary_candidates(&graph));
        if let Some(sentence) = self.sentence_candidate(&graph) {
            streams.push(vec![sentence]);
        }

        let mut merged = candidate::merge(streams);
        for filter in &self.filters {
            merged = filter.filter(merged);
        }
        if merged.is_empty() && !graph.is_fully_coverable() {
            error!(span = %span, "no candidates and segment is not fully coverable");
        }

        self.cache.borrow_mut().put(span.to_string(), merged.clone());
        merged
    }

    fn dictionary_candidates(&self, graph: &SyllableGraph) -> Vec<Candidate> {
        let mut out = Vec::new();
        for start in 0..graph.input_length {
            for entry in self.dictionary.lookup_from(graph, start) {
                let mut quality = entry.weight as f64;
                if let Some(db) = &self.userdict {
                    let key = format!("{:?}|{}", entry.code, entry.text);
                    quality += self.config.borrow().unigram_factor as f64 * (1.0 + db.weight(&key)).ln();
                }
                out.push(Candidate::simple(entry.text, entry.start, entry.end, quality as f32));
            }
        }
        out
    }

    fn sentence_candidate(&self, graph: &SyllableGraph) -> Option<Candidate> {
        let mut word_graph: WordGraph = WordGraph::new();
        for start in 0..graph.input_length {
            for entry in self.dictionary.lookup_from(graph, start) {
                word_graph.entry(entry.end).or_default().push(entry);
            }
        }
        let words = self.poet.make_sentence(&word_graph, graph.input_length)?;
        let text: String = words.iter().map(|w| w.text.as_str()).collect();
        Some(Candidate {
            text,
            start: 0,
            end: graph.input_length,
            quality: f32::MAX / 2.0,
            kind: CandidateKind::Sentence,
            comment: None,
        })
    }

    /// Learn a just-completed commit into the user dictionary and drop its
    /// cache entry, exactly once per commit (spec.md §4.7/§8). Cheap
    /// enough that clearing the whole LRU on every commit (rather than
    /// tracking per-segment cache keys touched) is not worth the
    /// bookkeeping.
    pub(crate) fn finalize_pending_commit(&self, ctx: &mut Context) {
        if !ctx.pending_learn {
            return;
        }
        ctx.pending_learn = false;
        if let (Some(db), Some((input, text))) = (&self.userdict, ctx.last_commit.clone()) {
            let key = format!("{input}|{text}");
            if let Err(e) = db.commit(&key) {
                error!(error = %e, "failed to learn committed candidate");
            }
        }
        self.cache.borrow_mut().clear();
    }
}
