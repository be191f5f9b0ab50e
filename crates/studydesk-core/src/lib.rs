//! # Studydesk Core Library
//!
//! Multi-timer engine for the Studydesk study assistant. Several named
//! countdowns run independently on one shared clock, survive restarts and
//! announce their completion exactly once. The CLI is a thin layer over
//! this crate.
//!
//! ## Architecture
//!
//! - **Timer Store**: the persisted timer collection, one JSON record in a
//!   SQLite key/value table
//! - **Tick Scheduler**: single clock; the caller drives `tick()` directly
//!   or through the async tick stream
//! - **Timer Controller**: validated create / start-pause / delete
//! - **Notifications**: completion observers, audible cue and status message
//!
//! ## Key Components
//!
//! - [`TimerController`]: user operations over a [`TimerStore`]
//! - [`TickScheduler`]: advances running timers and raises completions
//! - [`NotificationEmitter`]: one cue and message per completion
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod i18n;
pub mod notify;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, NotificationError, PersistenceError, ValidationError};
pub use events::{Completion, Event};
pub use i18n::{Language, Messages};
pub use notify::{Cue, NotificationEmitter, Severity, StatusMessage};
pub use storage::{Config, Database, TimerStore};
pub use timer::{
    format_hms, CompletionObserver, TickReport, TickScheduler, Timer, TimerController, TimerId,
    TimerPhase, TimerView,
};
