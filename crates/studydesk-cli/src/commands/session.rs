//! Interactive timer session.
//!
//! Ticks, stdin commands and Ctrl-C are multiplexed on one current-thread
//! runtime. Each branch finishes its store update before the next one is
//! polled, so ticks and user commands never interleave.

use std::cell::RefCell;
use std::rc::Rc;

use studydesk_core::{
    Config, CoreError, Event, Messages, NotificationEmitter, TickScheduler, TimerController,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use super::timer::{print_table, resolve_id, EventPrinter};

/// A line typed into the session.
#[derive(Debug, PartialEq, Eq)]
enum SessionCommand {
    Add { seconds: u32, name: String },
    Toggle(String),
    Delete(String),
    List,
    Help,
    Quit,
}

const HELP: &str = "commands: add <seconds> <name> | toggle <id> | delete <id> | list | help | quit";

fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    match verb {
        "add" => {
            let (secs, name) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: add <seconds> <name>".to_string())?;
            let seconds = secs
                .parse::<u32>()
                .map_err(|_| format!("not a number of seconds: {secs}"))?;
            Ok(SessionCommand::Add {
                seconds,
                name: name.trim().to_string(),
            })
        }
        "toggle" | "start" | "pause" if !rest.is_empty() => {
            Ok(SessionCommand::Toggle(rest.to_string()))
        }
        "delete" | "rm" if !rest.is_empty() => Ok(SessionCommand::Delete(rest.to_string())),
        "list" | "ls" => Ok(SessionCommand::List),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
        _ => Err(format!("unknown command: {line}")),
    }
}

/// Apply one command. Returns `false` when the session should end.
fn apply(
    controller: &mut TimerController,
    emitter: &RefCell<NotificationEmitter>,
    command: SessionCommand,
) -> bool {
    let messages = emitter.borrow().messages();
    match command {
        SessionCommand::Add { seconds, name } => match controller.create(&name, 0, 0, seconds) {
            Ok(timer) => {
                println!("{}  {}", timer.id(), timer.name());
                eprintln!("{}", messages.timer_created);
            }
            Err(CoreError::Validation(e)) => eprintln!("{}", messages.validation(&e)),
            Err(e) => warn!(error = %e, "failed to create timer"),
        },
        SessionCommand::Toggle(input) => {
            let id = resolve_id(controller.list(), &input);
            let name = controller.get(&id).map(|t| t.name().to_string()).unwrap_or_default();
            match controller.toggle_running(&id) {
                Ok(Some(Event::TimerStarted { .. })) => {
                    eprintln!("{}", messages.started(&name))
                }
                Ok(Some(_)) => eprintln!("{}", messages.paused(&name)),
                Ok(None) => eprintln!("{}", messages.already_completed(&name)),
                Err(CoreError::NotFound(_)) => eprintln!("{}", messages.timer_not_found),
                Err(e) => warn!(error = %e, "failed to toggle timer"),
            }
        }
        SessionCommand::Delete(input) => {
            let id = resolve_id(controller.list(), &input);
            match controller.delete(&id) {
                Ok(Event::TimerDeleted { id, name, .. }) => {
                    emitter.borrow_mut().forget(&id);
                    eprintln!("{}", messages.deleted(&name))
                }
                Ok(_) => {}
                Err(CoreError::NotFound(_)) => eprintln!("{}", messages.timer_not_found),
                Err(e) => warn!(error = %e, "failed to delete timer"),
            }
        }
        SessionCommand::List => print_table(controller.list(), messages),
        SessionCommand::Help => eprintln!("{HELP}"),
        SessionCommand::Quit => return false,
    }
    true
}

fn any_running(controller: &TimerController) -> bool {
    controller.list().iter().any(|t| t.is_running())
}

pub fn run(
    controller: TimerController,
    config: &Config,
    until_idle: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(session(controller, config, until_idle));
    // A pending stdin read sits on a blocking thread that cannot be cancelled.
    runtime.shutdown_background();
    result
}

async fn session(
    mut controller: TimerController,
    config: &Config,
    until_idle: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let emitter = Rc::new(RefCell::new(NotificationEmitter::from_config(config)));
    let mut scheduler = TickScheduler::new(config.tick_interval());
    scheduler.subscribe(Box::new(emitter.clone()));
    scheduler.subscribe(Box::new(EventPrinter));

    if until_idle && !any_running(&controller) {
        debug!("no running timers, nothing to do");
        return Ok(());
    }

    let messages: &Messages = emitter.borrow().messages();
    print_table(controller.list(), messages);
    eprintln!("{HELP}");

    let mut ticks = scheduler.start();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!(period_ms = config.timer.tick_interval_ms, "timer session started");
    loop {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
            tick = ticks.next() => {
                if tick.is_none() {
                    break;
                }
                let report = scheduler.tick(controller.store_mut());
                if !report.completions.is_empty() {
                    if let Some(status) = emitter.borrow().status() {
                        eprintln!("{}", status.text);
                    }
                }
                if until_idle && !any_running(&controller) {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => match parse_command(&line) {
                        Ok(command) => {
                            if !apply(&mut controller, &emitter, command) {
                                break;
                            }
                        }
                        Err(msg) => eprintln!("{msg}"),
                    },
                    Ok(None) => {
                        debug!("stdin closed, ticking until interrupted");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to read stdin");
                        stdin_open = false;
                    }
                }
            }
        }
    }

    scheduler.stop();
    info!(ticks = scheduler.tick_count(), "timer session ended");
    Ok(())
}
