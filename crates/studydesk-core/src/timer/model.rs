//! Timer records.
//!
//! A timer is a named countdown with a fixed duration in whole seconds.
//! Fields are only mutable from inside the crate: the controller toggles
//! `is_running`, the scheduler decrements `remaining`.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::events::Event;

/// Opaque timer identifier.
///
/// Fresh ids are UUID v4 strings. Older snapshots stored numeric ids
/// (epoch milliseconds); those deserialize into their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TimerId(String);

impl TimerId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TimerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TimerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'de> Deserialize<'de> for TimerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

/// Where a timer sits in its lifecycle. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    /// Counted down to zero. Terminal until deleted.
    Completed,
}

impl TimerPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Completed => "completed",
        }
    }
}

/// Result of advancing one timer by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Advance {
    /// Not running; nothing happened.
    Skipped,
    Decremented,
    /// Reached zero on this tick; `is_running` has been cleared.
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub(crate) id: TimerId,
    pub(crate) name: String,
    /// Total seconds, always >= 1.
    pub(crate) duration: u64,
    /// Seconds left, always <= duration.
    pub(crate) remaining: u64,
    pub(crate) is_running: bool,
}

impl Timer {
    pub(crate) fn new(id: TimerId, name: String, duration: u64) -> Self {
        Self {
            id,
            name,
            duration,
            remaining: duration,
            is_running: false,
        }
    }

    pub fn id(&self) -> &TimerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn phase(&self) -> TimerPhase {
        if self.is_running {
            TimerPhase::Running
        } else if self.remaining == 0 {
            TimerPhase::Completed
        } else {
            TimerPhase::Idle
        }
    }

    /// Flip between running and paused.
    ///
    /// Returns the new running flag, or `None` when the timer has already
    /// completed and cannot run again.
    pub(crate) fn toggle(&mut self) -> Option<bool> {
        if self.remaining == 0 && !self.is_running {
            return None;
        }
        self.is_running = !self.is_running;
        Some(self.is_running)
    }

    pub(crate) fn advance(&mut self) -> Advance {
        if !self.is_running {
            return Advance::Skipped;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.is_running = false;
            return Advance::Completed;
        }
        Advance::Decremented
    }

    /// The event announcing this timer's creation.
    pub fn created_event(&self) -> Event {
        Event::TimerCreated {
            id: self.id.clone(),
            name: self.name.clone(),
            duration_secs: self.duration,
            at: Utc::now(),
        }
    }

    pub fn view(&self) -> TimerView {
        TimerView {
            id: self.id.clone(),
            name: self.name.clone(),
            duration: self.duration,
            remaining: self.remaining,
            is_running: self.is_running,
            phase: self.phase(),
            display: format_hms(self.remaining),
        }
    }
}

/// Serializable read-only view of a timer, as printed by `timer list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub id: TimerId,
    pub name: String,
    pub duration: u64,
    pub remaining: u64,
    pub is_running: bool,
    pub phase: TimerPhase,
    /// `HH:MM:SS`
    pub display: String,
}

/// Render seconds as zero-padded `HH:MM:SS`. Hours are not wrapped.
pub fn format_hms(total_secs: u64) -> String {
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_timer_is_idle_and_full() {
        let timer = Timer::new(TimerId::from("a"), "Study".into(), 90);
        assert_eq!(timer.remaining(), 90);
        assert_eq!(timer.phase(), TimerPhase::Idle);
    }

    #[test]
    fn advance_completes_on_reaching_zero() {
        let mut timer = Timer::new(TimerId::from("a"), "Study".into(), 2);
        assert_eq!(timer.advance(), Advance::Skipped);

        timer.toggle();
        assert_eq!(timer.advance(), Advance::Decremented);
        assert_eq!(timer.advance(), Advance::Completed);
        assert_eq!(timer.remaining(), 0);
        assert!(!timer.is_running());
        assert_eq!(timer.phase(), TimerPhase::Completed);
        assert_eq!(timer.advance(), Advance::Skipped);
    }

    #[test]
    fn running_at_zero_completes_without_underflow() {
        let mut timer = Timer::new(TimerId::from("a"), "Legacy".into(), 3);
        timer.remaining = 0;
        timer.is_running = true;
        assert_eq!(timer.advance(), Advance::Completed);
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn completed_timer_cannot_toggle() {
        let mut timer = Timer::new(TimerId::from("a"), "Done".into(), 1);
        timer.toggle();
        timer.advance();
        assert_eq!(timer.toggle(), None);
        assert!(!timer.is_running());
    }

    #[test]
    fn format_hms_pads_and_does_not_wrap_hours() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(5), "00:00:05");
        assert_eq!(format_hms(3661), "01:01:01");
        assert_eq!(format_hms(100 * 3600), "100:00:00");
    }

    #[test]
    fn numeric_ids_deserialize_as_strings() {
        let id: TimerId = serde_json::from_str("1712345678901").unwrap();
        assert_eq!(id.as_str(), "1712345678901");
        let id: TimerId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id, TimerId::from("abc"));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let timer = Timer::new(TimerId::from("a"), "Study".into(), 5);
        let json = serde_json::to_value(&timer).unwrap();
        assert_eq!(json["isRunning"], serde_json::Value::Bool(false));
        assert_eq!(json["remaining"], 5);
    }
}
