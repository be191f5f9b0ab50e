mod cue;
mod emitter;

pub use cue::{cue_from_config, CommandCue, Cue, SilentCue, TerminalBell};
pub use emitter::{NotificationEmitter, Severity, StatusMessage};
