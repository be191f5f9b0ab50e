use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerId, TimerView};

/// Every state change in the timer subsystem produces an Event.
/// The CLI prints them; observers may log or forward them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerCreated {
        id: TimerId,
        name: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStarted {
        id: TimerId,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        id: TimerId,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerDeleted {
        id: TimerId,
        name: String,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        id: TimerId,
        name: String,
        duration_secs: u64,
        tick: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        timers: Vec<TimerView>,
        running: usize,
        at: DateTime<Utc>,
    },
}

/// A running timer reached zero. Raised once per timer by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub id: TimerId,
    pub name: String,
    pub duration_secs: u64,
    /// Scheduler tick number on which the timer completed.
    pub tick: u64,
    pub at: DateTime<Utc>,
}

impl From<&Completion> for Event {
    fn from(c: &Completion) -> Self {
        Event::TimerCompleted {
            id: c.id.clone(),
            name: c.name.clone(),
            duration_secs: c.duration_secs,
            tick: c.tick,
            at: c.at,
        }
    }
}
