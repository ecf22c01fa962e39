//! [`Dictionary`]: combines a [`Prism`] and [`Table`] into the lookup
//! surface translators query against a [`SyllableGraph`].
//!
//! Grounded on `core/src/engine.rs::Engine::generate_candidates_from_segmentation`'s
//! per-start-position lookup loop, generalized from a flat string-keyed
//! `Lexicon` to `Table::query` over `Code`s built from graph edges.

use std::path::Path;

use crate::dict_entry::DictEntry;
use crate::error::CoreResult;
use crate::prism::Prism;
use crate::syllable::Code;
use crate::syllabifier::SyllableGraph;
use crate::table::Table;

pub struct Dictionary {
    pub prism: Prism,
    pub table: Table,
}

impl Dictionary {
    pub fn new(prism: Prism, table: Table) -> Self {
        Dictionary { prism, table }
    }

    pub fn load(prism_path: &Path, table_path: &Path) -> CoreResult<Self> {
        Ok(Dictionary {
            prism: Prism::load(prism_path)?,
            table: Table::load(table_path)?,
        })
    }

    pub fn save(&self, prism_path: &Path, table_path: &Path) -> CoreResult<()> {
        self.prism.save(prism_path)?;
        self.table.save(table_path)?;
        Ok(())
    }

    /// All dictionary entries reachable from `start` in `graph`, one
    /// `DictEntry` per `(edge, table entry)` pair, with weight scaled by the
    /// edge's credibility (spec.md §4.6's "credibility-weighted merge").
    pub fn lookup_from(&self, graph: &SyllableGraph, start: usize) -> Vec<DictEntry> {
        let mut out = Vec::new();
        for &(end, props) in graph.edges_from(start) {
            let code = Code(vec![props.syllable_id]);
            for entry in self.table.query(&code) {
                out.push(DictEntry {
                    text: entry.text.clone(),
                    code: code.clone(),
                    start,
                    end,
                    weight: entry.weight * props.credibility,
                });
            }
        }
        out
    }

    /// Multi-syllable lookup: resolve a whole `(start, end)` span against the
    /// table by chaining every edge on a path through the graph. Returns
    /// entries keyed by the composed `Code`, supporting long dictionary
    /// entries the same way `Engine`'s "try the FULL segmentation as a
    /// single key" branch does.
    pub fn lookup_span(&self, graph: &SyllableGraph, start: usize, end: usize) -> Vec<DictEntry> {
        let mut codes: Vec<(Code, f32)> = vec![(Code::default(), 1.0)];
        let mut pos = start;
        while pos < end {
            let mut next = Vec::new();
            for &(edge_end, props) in graph.edges_from(pos) {
                if edge_end > end {
                    continue;
                }
                for (code, cred) in &codes {
                    let mut extended = code.clone();
                    extended.push(props.syllable_id);
                    next.push((extended, cred * props.credibility));
                }
            }
            if next.is_empty() {
                return Vec::new();
            }
            // Advance pos to the smallest edge_end among surviving paths;
            // since this function is only used for single-path span probes
            // (one known edge sequence) in practice, all edges share an end.
            pos = graph
                .edges_from(pos)
                .iter()
                .map(|(e, _)| *e)
                .min()
                .unwrap_or(end);
            codes = next;
        }
        let mut out = Vec::new();
        for (code, cred) in codes {
            if code.len() == 0 {
                continue;
            }
            for entry in self.table.query(&code) {
                out.push(DictEntry {
                    text: entry.text.clone(),
                    code: code.clone(),
                    start,
                    end,
                    weight: entry.weight * cred,
                });
            }
        }
        out
    }
}
