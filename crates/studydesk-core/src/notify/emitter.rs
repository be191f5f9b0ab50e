//! Completion notifications.
//!
//! One cue plus one transient status message per completed timer. Cue
//! failures are logged and swallowed; they never reach the scheduler.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::cue::{cue_from_config, Cue};
use crate::events::Completion;
use crate::i18n::Messages;
use crate::storage::Config;
use crate::timer::{CompletionObserver, TimerId};

const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Error,
}

/// Short-lived message shown to the user, e.g. "Time's up: Study".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
    pub posted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StatusMessage {
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

pub struct NotificationEmitter {
    cue: Box<dyn Cue>,
    messages: &'static Messages,
    status_timeout: TimeDelta,
    status: Option<StatusMessage>,
    notified: HashSet<TimerId>,
    delivered: u64,
    cue_failures: u64,
}

impl NotificationEmitter {
    pub fn new(cue: Box<dyn Cue>, messages: &'static Messages) -> Self {
        Self {
            cue,
            messages,
            status_timeout: to_delta(DEFAULT_STATUS_TIMEOUT),
            status: None,
            notified: HashSet::new(),
            delivered: 0,
            cue_failures: 0,
        }
    }

    /// Cue, language and timeout taken from the configuration.
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            cue_from_config(&cfg.notifications),
            Messages::for_language(&cfg.language),
        )
        .with_status_timeout(cfg.status_timeout())
    }

    pub fn with_status_timeout(mut self, timeout: Duration) -> Self {
        self.status_timeout = to_delta(timeout);
        self
    }

    pub fn messages(&self) -> &'static Messages {
        self.messages
    }

    /// Deliver the notification for one completion.
    ///
    /// Returns `false` when this timer was already notified.
    pub fn notify(&mut self, completion: &Completion) -> bool {
        if !self.notified.insert(completion.id.clone()) {
            debug!(id = %completion.id, "duplicate completion ignored");
            return false;
        }

        if let Err(e) = self.cue.play() {
            self.cue_failures += 1;
            warn!(id = %completion.id, error = %e, "completion cue failed");
        }

        let text = self.messages.completed(&completion.name);
        self.post(text, Severity::Info);
        self.delivered += 1;
        true
    }

    /// Drop the dedupe entry of a deleted timer.
    pub fn forget(&mut self, id: &TimerId) -> bool {
        self.notified.remove(id)
    }

    /// Replace the current status message.
    pub fn post(&mut self, text: impl Into<String>, severity: Severity) {
        let posted_at = Utc::now();
        self.status = Some(StatusMessage {
            text: text.into(),
            severity,
            posted_at,
            expires_at: posted_at
                .checked_add_signed(self.status_timeout)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        });
    }

    /// The status message, if one is still visible.
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status_at(Utc::now())
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> Option<&StatusMessage> {
        self.status.as_ref().filter(|s| s.is_visible_at(now))
    }

    /// Remove and return the latest status message regardless of expiry.
    pub fn take_status(&mut self) -> Option<StatusMessage> {
        self.status.take()
    }

    /// Completions notified so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn cue_failures(&self) -> u64 {
        self.cue_failures
    }
}

impl CompletionObserver for NotificationEmitter {
    fn on_completion(&mut self, completion: &Completion) {
        self.notify(completion);
    }
}

fn to_delta(d: Duration) -> TimeDelta {
    TimeDelta::from_std(d).unwrap_or_else(|_| TimeDelta::seconds(6))
}
