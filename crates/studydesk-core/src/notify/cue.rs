//! Audible cues.
//!
//! A cue may fail for reasons unrelated to timer state (no terminal, missing
//! player binary). Callers log the error and carry on.

use std::io::{self, Write};
use std::process::{Child, Command, Stdio};

use tracing::warn;

use crate::error::NotificationError;
use crate::storage::{CueKind, NotificationsConfig};

/// The single capability of the notification side channel.
pub trait Cue {
    fn play(&mut self) -> Result<(), NotificationError>;
}

/// Writes the BEL control character.
pub struct TerminalBell<W: Write> {
    out: W,
}

impl TerminalBell<io::Stderr> {
    pub fn stderr() -> Self {
        Self { out: io::stderr() }
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Cue for TerminalBell<W> {
    fn play(&mut self) -> Result<(), NotificationError> {
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Launches an external player without waiting for it.
///
/// Finished players are reaped on the next `play`, so a slow sound never
/// holds up the tick loop.
pub struct CommandCue {
    program: String,
    args: Vec<String>,
    children: Vec<Child>,
}

impl CommandCue {
    /// Build from `[program, args...]`.
    pub fn from_argv(argv: &[String]) -> Result<Self, NotificationError> {
        let (program, args) = argv.split_first().ok_or(NotificationError::EmptyCommand)?;
        if program.trim().is_empty() {
            return Err(NotificationError::EmptyCommand);
        }
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            children: Vec::new(),
        })
    }

    fn reap(&mut self) {
        let program = &self.program;
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    let err = NotificationError::CommandFailed {
                        program: program.clone(),
                        status: status.to_string(),
                    };
                    warn!(error = %err, "cue player failed");
                }
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!(%program, error = %e, "failed to poll cue player");
                false
            }
        });
    }
}

impl Cue for CommandCue {
    fn play(&mut self) -> Result<(), NotificationError> {
        self.reap();
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.children.push(child);
        Ok(())
    }
}

/// No sound at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCue;

impl Cue for SilentCue {
    fn play(&mut self) -> Result<(), NotificationError> {
        Ok(())
    }
}

/// Pick the cue described by the notification settings.
///
/// A broken command configuration degrades to silence.
pub fn cue_from_config(cfg: &NotificationsConfig) -> Box<dyn Cue> {
    if !cfg.enabled {
        return Box::new(SilentCue);
    }
    match cfg.sound {
        CueKind::Bell => Box::new(TerminalBell::stderr()),
        CueKind::None => Box::new(SilentCue),
        CueKind::Command => match CommandCue::from_argv(&cfg.command) {
            Ok(cue) => Box::new(cue),
            Err(e) => {
                warn!(error = %e, "notification command unusable, cues disabled");
                Box::new(SilentCue)
            }
        },
    }
}
