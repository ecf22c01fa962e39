//! Schema-wide configuration, serializable to/from TOML.
//!
//! Grounded on the teacher's `Config` (`core/src/lib.rs`): the
//! `load_toml`/`save_toml`/`from_toml_str`/`to_toml_string` API and the
//! penalty-constant fields are carried over; per SPEC_FULL §A.4 this adds
//! the fields the teacher left as scattered magic numbers (half-life,
//! sentence penalty, revert window, index-code max length) as real config
//! with documented defaults.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identifier and display name surfaced through `Service::get_status`.
    pub schema_id: String,
    pub schema_name: String,
    /// Idle duration after which `Service::cleanup_stale_sessions` reclaims a
    /// session (spec.md §6).
    pub session_idle_timeout_secs: u64,
    pub fuzzy_rules: Vec<String>,
    pub fuzzy_enabled: bool,
    pub auto_suggestion: bool,
    pub min_suggestion_trigger_length: usize,
    pub full_width_enabled: bool,
    pub select_keys: String,
    pub masked_phrases: HashSet<String>,
    pub page_size: usize,
    pub candidate_cache_size: usize,

    /// Penalty subtracted (as a log-space multiplier) for a correction-rule
    /// match versus an exact spelling.
    pub correction_penalty: i32,
    pub fuzzy_penalty_multiplier: i32,
    pub incomplete_penalty: i32,
    pub unknown_penalty: i32,
    pub unknown_cost: f32,
    pub full_key_boost: f32,
    pub lambda: f32,
    pub sentence_length_penalty: f32,
    pub unigram_factor: f32,

    /// Ticks after which a read-only access's decayed weight halves
    /// (spec.md §4.7's weight-decay half-life).
    pub user_dict_half_life_ticks: u32,
    /// Flat per-word multiplier in the poet's sentence-weight recurrence
    /// (spec.md §4.8).
    pub sentence_penalty: f64,
    /// How many top-weighted homophone entries the poet keeps per edge
    /// (`kMaxHomophonesInMind` in the original).
    pub max_homophones_in_mind: usize,
    /// Window during which the most recent user-dict commit can be reverted.
    pub revert_transaction_window_secs: u64,
    /// Split point between the table's head and trunk index levels
    /// (spec.md §3's `kIndexCodeMaxLength`).
    pub index_code_max_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            schema_id: "pinyin".to_string(),
            schema_name: "Pinyin".to_string(),
            session_idle_timeout_secs: 300,
            fuzzy_rules: Vec::new(),
            fuzzy_enabled: false,
            auto_suggestion: true,
            min_suggestion_trigger_length: 2,
            full_width_enabled: false,
            select_keys: "1234567890".to_string(),
            masked_phrases: HashSet::new(),
            page_size: 5,
            candidate_cache_size: 512,
            correction_penalty: 200,
            fuzzy_penalty_multiplier: 100,
            incomplete_penalty: 500,
            unknown_penalty: 1000,
            unknown_cost: 10.0,
            full_key_boost: 2.0,
            lambda: 0.293,
            sentence_length_penalty: 1.2f32.ln(),
            unigram_factor: 3.0,
            user_dict_half_life_ticks: 300,
            sentence_penalty: 1e-8,
            max_homophones_in_mind: 1,
            revert_transaction_window_secs: 2,
            index_code_max_length: 3,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> CoreResult<Self> {
        toml::from_str(s).map_err(|e| CoreError::Corrupt(e.to_string()))
    }

    pub fn to_toml_string(&self) -> CoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::Corrupt(e.to_string()))
    }

    pub fn load_toml(path: &Path) -> CoreResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn save_toml(&self, path: &Path) -> CoreResult<()> {
        let text = self.to_toml_string()?;
        fs::write(path, text)?;
        Ok(())
    }

    pub fn toggle_fullwidth(&mut self) {
        self.full_width_enabled = !self.full_width_enabled;
    }

    pub fn mask_phrase(&mut self, phrase: &str) {
        self.masked_phrases.insert(phrase.to_string());
    }

    pub fn unmask_phrase(&mut self, phrase: &str) {
        self.masked_phrases.remove(phrase);
    }

    pub fn is_masked(&self, phrase: &str) -> bool {
        self.masked_phrases.contains(phrase)
    }

    pub fn set_select_keys(&mut self, keys: &str) {
        self.select_keys = keys.to_string();
    }

    pub fn selection_key_index(&self, ch: char) -> Option<usize> {
        self.select_keys.chars().position(|c| c == ch)
    }
}
