//! Durable timer collection.
//!
//! The whole collection is one JSON array stored under [`TIMERS_KEY`].
//! Every write is a full snapshot; the last writer wins.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, warn};

use super::Database;
use crate::error::PersistenceError;
use crate::timer::{Timer, TimerId};

/// Name of the record holding the timer collection.
pub const TIMERS_KEY: &str = "timers";

/// On-disk shape of a timer. Missing fields fall back to safe values.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimerRecord {
    id: TimerId,
    name: String,
    duration: u64,
    #[serde(default)]
    remaining: Option<u64>,
    #[serde(default)]
    is_running: bool,
}

impl TimerRecord {
    fn into_timer(self) -> Option<Timer> {
        if self.name.trim().is_empty() || self.duration == 0 {
            return None;
        }
        Some(Timer {
            remaining: self.remaining.unwrap_or(self.duration).min(self.duration),
            id: self.id,
            name: self.name,
            duration: self.duration,
            is_running: self.is_running,
        })
    }
}

/// Authoritative, persisted collection of timers in insertion order.
pub struct TimerStore {
    db: Database,
    timers: Vec<Timer>,
    /// Set when the last flush failed; cleared by the next successful one.
    dirty: bool,
}

impl TimerStore {
    /// Wrap a database and restore the persisted collection from it.
    pub fn open(db: Database) -> Self {
        let mut store = Self {
            db,
            timers: Vec::new(),
            dirty: false,
        };
        store.timers = store.load();
        debug!(count = store.timers.len(), "timer store opened");
        store
    }

    /// Open the default on-disk store.
    pub fn open_default() -> Result<Self, PersistenceError> {
        Ok(Self::open(Database::open()?))
    }

    /// In-memory store, mostly for tests.
    pub fn in_memory() -> Result<Self, PersistenceError> {
        Ok(Self::open(Database::open_memory()?))
    }

    /// Read the persisted collection.
    ///
    /// Never fails: a missing record, unreadable database or corrupt JSON
    /// all yield an empty collection.
    pub fn load(&self) -> Vec<Timer> {
        match self.db.kv_get(TIMERS_KEY) {
            Ok(Some(json)) => decode_timers(&json),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read timers, starting empty");
                Vec::new()
            }
        }
    }

    /// Overwrite the persisted collection with `timers`.
    pub fn save(&self, timers: &[Timer]) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(timers).map_err(|source| PersistenceError::Corrupt {
            key: TIMERS_KEY.to_string(),
            source,
        })?;
        self.db.kv_set(TIMERS_KEY, &json)
    }

    /// Persist the current in-memory collection.
    ///
    /// Failures are logged and leave memory untouched. Returns whether the
    /// write succeeded.
    pub fn flush(&mut self) -> bool {
        match self.save(&self.timers) {
            Ok(()) => {
                if self.dirty {
                    debug!("timer store reconciled after earlier save failure");
                }
                self.dirty = false;
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to persist timers");
                self.dirty = true;
                false
            }
        }
    }

    pub fn timers(&self) -> &[Timer] {
        &self.timers
    }

    pub fn get(&self, id: &TimerId) -> Option<&Timer> {
        self.timers.iter().find(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Whether memory holds changes the last flush failed to write.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn get_mut(&mut self, id: &TimerId) -> Option<&mut Timer> {
        self.timers.iter_mut().find(|t| &t.id == id)
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Timer> {
        self.timers.iter_mut()
    }

    /// Append a timer. Rejects ids already present.
    pub(crate) fn insert(&mut self, timer: Timer) -> Result<(), PersistenceError> {
        if self.get(&timer.id).is_some() {
            return Err(PersistenceError::DuplicateId(timer.id));
        }
        self.timers.push(timer);
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: &TimerId) -> Option<Timer> {
        let index = self.timers.iter().position(|t| &t.id == id)?;
        Some(self.timers.remove(index))
    }
}

/// Decode a persisted collection, repairing or dropping bad records.
fn decode_timers(json: &str) -> Vec<Timer> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(json) {
        Ok(values) => values,
        Err(e) => {
            warn!(error = %e, "corrupt timer record, starting empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut timers = Vec::with_capacity(values.len());
    for value in values {
        let record = match serde_json::from_value::<TimerRecord>(value) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "skipping unreadable timer");
                continue;
            }
        };
        let id = record.id.clone();
        let Some(timer) = record.into_timer() else {
            warn!(%id, "skipping invalid timer");
            continue;
        };
        if !seen.insert(timer.id.clone()) {
            warn!(%id, "skipping duplicate timer id");
            continue;
        }
        timers.push(timer);
    }
    timers
}
