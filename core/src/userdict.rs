//! User dictionary: per-entry commit counts, recency-decayed weight, and a
//! short revert window for undoing the most recent commit (spec.md §4.7).
//!
//! The storage layer is grounded directly on the teacher's `UserDict`
//! (`redb` table, read-then-write learn with `TableDoesNotExist` treated as
//! empty); the record shape and update formula are generalized from a bare
//! `u64` frequency counter to the `(commits, dee, last_tick)` triple spec.md
//! §3/§4.7 describes, and transaction/tombstone handling is grounded on
//! `examples/original_source/include/rime/dict/user_dictionary.h`'s
//! `UpdateEntry`/`NewTransaction`/`RevertRecentTransaction` contract.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use redb::{Database, ReadableTable, TableDefinition};
use tracing::{debug, warn};

use crate::error::{CoreError, CoreResult};

const RECORDS: TableDefinition<&str, &[u8]> = TableDefinition::new("user_dict_records");
const META: TableDefinition<&str, u64> = TableDefinition::new("user_dict_meta");
const TICK_KEY: &str = "__tick__";

/// One user-dictionary record for a `(code, text)` pair (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserRecord {
    /// Number of times the user has explicitly selected this entry.
    /// Negative means tombstoned (spec.md §4.7: `commits' = min(-1, -|prev|)`).
    pub commits: i64,
    /// Decayed effective frequency ("dynamic estimate of exposure").
    pub dee: f64,
    /// Tick at which this record was last touched.
    pub last_tick: u64,
}

impl UserRecord {
    fn encode(&self) -> [u8; 24] {
        let mut buf = [0u8; 24];
        buf[0..8].copy_from_slice(&self.commits.to_le_bytes());
        buf[8..16].copy_from_slice(&self.dee.to_bits().to_le_bytes());
        buf[16..24].copy_from_slice(&self.last_tick.to_le_bytes());
        buf
    }

    fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 24 {
            return None;
        }
        let commits = i64::from_le_bytes(bytes[0..8].try_into().ok()?);
        let dee = f64::from_bits(u64::from_le_bytes(bytes[8..16].try_into().ok()?));
        let last_tick = u64::from_le_bytes(bytes[16..24].try_into().ok()?);
        Some(UserRecord {
            commits,
            dee,
            last_tick,
        })
    }

    pub fn is_tombstoned(&self) -> bool {
        self.commits < 0
    }
}

fn decay(delta_ticks: u64, half_life: u32) -> f64 {
    if half_life == 0 {
        return 1.0;
    }
    0.5f64.powf(delta_ticks as f64 / half_life as f64)
}

struct PendingTransaction {
    key: String,
    previous: Option<UserRecord>,
    at: Instant,
}

/// Records the last write so it can be reverted within a short window,
/// mirroring `UserDictionary::NewTransaction`/`RevertRecentTransaction`.
#[derive(Clone)]
pub struct UserDb {
    db: Arc<Database>,
    #[allow(dead_code)]
    path: PathBuf,
    half_life: u32,
    pending: Arc<Mutex<Option<PendingTransaction>>>,
    revert_window: Duration,
}

impl UserDb {
    pub fn open<P: AsRef<std::path::Path>>(
        path: P,
        half_life: u32,
        revert_window: Duration,
    ) -> CoreResult<Self> {
        if let Some(dir) = path.as_ref().parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        let db = Database::create(path.as_ref()).map_err(|e| CoreError::Redb(e.to_string()))?;
        Ok(UserDb {
            db: Arc::new(db),
            path: path.as_ref().to_path_buf(),
            half_life,
            pending: Arc::new(Mutex::new(None)),
            revert_window,
        })
    }

    fn current_tick(&self) -> CoreResult<u64> {
        let r = self.db.begin_read().map_err(|e| CoreError::Redb(e.to_string()))?;
        match r.open_table(META) {
            Ok(table) => Ok(table.get(TICK_KEY).map_err(|e| CoreError::Redb(e.to_string()))?.map(|v| v.value()).unwrap_or(0)),
            Err(redb::TableError::TableDoesNotExist(_)) => Ok(0),
            Err(e) => Err(CoreError::Redb(e.to_string())),
        }
    }

    /// Advance the shared tick counter and return the new value (spec.md
    /// §4.7's "tick monotonicity" invariant: every session's commit bumps a
    /// single shared counter, never resets).
    pub fn advance_tick(&self) -> CoreResult<u64> {
        let w = self.db.begin_write().map_err(|e| CoreError::Redb(e.to_string()))?;
        let next = {
            let mut table = w.open_table(META).map_err(|e| CoreError::Redb(e.to_string()))?;
            let cur = table.get(TICK_KEY).map_err(|e| CoreError::Redb(e.to_string()))?.map(|v| v.value()).unwrap_or(0);
            let next = cur + 1;
            table.insert(TICK_KEY, &next).map_err(|e| CoreError::Redb(e.to_string()))?;
            next
        };
        w.commit().map_err(|e| CoreError::Redb(e.to_string()))?;
        Ok(next)
    }

    fn get_record(&self, key: &str) -> CoreResult<Option<UserRecord>> {
        let r = self.db.begin_read().map_err(|e| CoreError::Redb(e.to_string()))?;
        match r.open_table(RECORDS) {
            Ok(table) => {
                let v = table.get(key).map_err(|e| CoreError::Redb(e.to_string()))?;
                Ok(v.and_then(|g| UserRecord::decode(g.value())))
            }
            Err(redb::TableError::TableDoesNotExist(_)) => Ok(None),
            Err(e) => Err(CoreError::Redb(e.to_string())),
        }
    }

    fn put_record(&self, key: &str, record: UserRecord) -> CoreResult<()> {
        let w = self.db.begin_write().map_err(|e| CoreError::Redb(e.to_string()))?;
        {
            let mut table = w.open_table(RECORDS).map_err(|e| CoreError::Redb(e.to_string()))?;
            let encoded = record.encode();
            table
                .insert(key, encoded.as_slice())
                .map_err(|e| CoreError::Redb(e.to_string()))?;
        }
        w.commit().map_err(|e| CoreError::Redb(e.to_string()))?;
        Ok(())
    }

    /// Read-time update (spec.md §4.7, `commits == 0` branch): decays `dee`
    /// toward the current tick and bumps it by 1, without touching commits.
    pub fn touch_read(&self, key: &str) -> CoreResult<UserRecord> {
        let tick = self.current_tick()?;
        let existing = self.get_record(key)?;
        let updated = match existing {
            Some(rec) if rec.commits == 0 => {
                let delta = tick.saturating_sub(rec.last_tick);
                UserRecord {
                    commits: 0,
                    dee: rec.dee * decay(delta, self.half_life) + 1.0,
                    last_tick: tick,
                }
            }
            Some(rec) => rec,
            None => UserRecord {
                commits: 0,
                dee: 1.0,
                last_tick: tick,
            },
        };
        self.put_record(key, updated)?;
        Ok(updated)
    }

    /// Commit-time update (spec.md §4.7, `commits > 0` branch): the user
    /// selected this entry, so bump commits and `dee` together.
    pub fn commit(&self, key: &str) -> CoreResult<UserRecord> {
        let tick = self.advance_tick()?;
        let existing = self.get_record(key)?;
        let previous = existing;
        let updated = match existing {
            Some(rec) if !rec.is_tombstoned() => {
                let delta = tick.saturating_sub(rec.last_tick);
                UserRecord {
                    commits: rec.commits + 1,
                    dee: rec.dee * decay(delta, self.half_life) + 1.0,
                    last_tick: tick,
                }
            }
            _ => UserRecord {
                commits: 1,
                dee: 1.0,
                last_tick: tick,
            },
        };
        self.put_record(key, updated)?;
        *self.pending.lock().unwrap() = Some(PendingTransaction {
            key: key.to_string(),
            previous,
            at: Instant::now(),
        });
        debug!(key, commits = updated.commits, dee = updated.dee, "user dict commit");
        Ok(updated)
    }

    /// Tombstone-time update (spec.md §4.7, `commits < 0` branch): the user
    /// explicitly removed this entry from future suggestions.
    pub fn forget(&self, key: &str) -> CoreResult<UserRecord> {
        let existing = self.get_record(key)?;
        let prev_commits = existing.map(|r| r.commits.abs()).unwrap_or(0);
        let updated = UserRecord {
            commits: (-prev_commits).min(-1),
            dee: 0.0,
            last_tick: self.current_tick()?,
        };
        self.put_record(key, updated)?;
        warn!(key, "user dict entry tombstoned");
        Ok(updated)
    }

    /// Undo the most recent commit if it happened within the revert window
    /// (spec.md §4.7's "e.g., 2s" revert window, grounded on
    /// `UserDictionary::RevertRecentTransaction`).
    pub fn revert_recent(&self) -> CoreResult<bool> {
        let mut guard = self.pending.lock().unwrap();
        let Some(txn) = guard.take() else {
            return Ok(false);
        };
        if txn.at.elapsed() > self.revert_window {
            return Ok(false);
        }
        match txn.previous {
            Some(rec) => self.put_record(&txn.key, rec)?,
            None => {
                let w = self.db.begin_write().map_err(|e| CoreError::Redb(e.to_string()))?;
                {
                    if let Ok(mut table) = w.open_table(RECORDS) {
                        let _ = table.remove(txn.key.as_str());
                    }
                }
                w.commit().map_err(|e| CoreError::Redb(e.to_string()))?;
            }
        }
        Ok(true)
    }

    pub fn weight(&self, key: &str) -> f64 {
        match self.get_record(key) {
            Ok(Some(rec)) if !rec.is_tombstoned() => rec.dee,
            _ => 0.0,
        }
    }

    pub fn is_tombstoned(&self, key: &str) -> bool {
        matches!(self.get_record(key), Ok(Some(rec)) if rec.is_tombstoned())
    }

    /// Snapshot every non-tombstoned record, for TSV-style export/backup
    /// (mirrors the teacher's `snapshot`/`iter_all`).
    pub fn snapshot(&self) -> CoreResult<Vec<(String, UserRecord)>> {
        let mut out = Vec::new();
        let r = self.db.begin_read().map_err(|e| CoreError::Redb(e.to_string()))?;
        match r.open_table(RECORDS) {
            Ok(table) => {
                for item in table.iter().map_err(|e| CoreError::Redb(e.to_string()))? {
                    let (k, v) = item.map_err(|e| CoreError::Redb(e.to_string()))?;
                    if let Some(rec) = UserRecord::decode(v.value()) {
                        out.push((k.value().to_string(), rec));
                    }
                }
            }
            Err(redb::TableError::TableDoesNotExist(_)) => {}
            Err(e) => return Err(CoreError::Redb(e.to_string())),
        }
        Ok(out)
    }
}
