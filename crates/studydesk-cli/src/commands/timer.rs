use std::cell::RefCell;
use std::rc::Rc;

use clap::Subcommand;
use studydesk_core::storage::TimerStore;
use studydesk_core::{
    Completion, CompletionObserver, Config, CoreError, Event, Messages, NotificationEmitter,
    TickScheduler, Timer, TimerController, TimerId, TimerView,
};
use tracing::warn;

use super::session;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Create a new countdown timer
    Add {
        /// Display name
        name: String,
        #[arg(long, short = 'H', default_value_t = 0)]
        hours: u32,
        #[arg(long, short, default_value_t = 0)]
        minutes: u32,
        #[arg(long, short, default_value_t = 0)]
        seconds: u32,
    },
    /// List timers
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start a paused timer or pause a running one
    Toggle {
        /// Timer id or unique id prefix
        id: String,
    },
    /// Delete a timer
    Delete {
        /// Timer id or unique id prefix
        id: String,
    },
    /// Apply ticks immediately, without waiting
    Tick {
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
    /// Tick in the foreground and accept commands on stdin
    Run {
        /// Exit once no timer is running
        #[arg(long)]
        until_idle: bool,
    },
}

/// Prints every completion as a JSON event on stdout.
pub(crate) struct EventPrinter;

impl CompletionObserver for EventPrinter {
    fn on_completion(&mut self, completion: &Completion) {
        match serde_json::to_string(&Event::from(completion)) {
            Ok(json) => println!("{json}"),
            Err(e) => warn!(error = %e, "failed to encode completion"),
        }
    }
}

/// Resolve a full id or a unique prefix of one.
///
/// Unknown or ambiguous input is returned unchanged and will fail lookup.
pub(crate) fn resolve_id(timers: &[Timer], input: &str) -> TimerId {
    if let Some(t) = timers.iter().find(|t| t.id().as_str() == input) {
        return t.id().clone();
    }
    let mut matches = timers.iter().filter(|t| t.id().as_str().starts_with(input));
    match (matches.next(), matches.next()) {
        (Some(t), None) if !input.is_empty() => t.id().clone(),
        _ => TimerId::from(input),
    }
}

pub(crate) fn print_table(timers: &[Timer], messages: &Messages) {
    if timers.is_empty() {
        println!("{}", messages.no_timers);
        return;
    }
    for timer in timers {
        let view = timer.view();
        println!(
            "{}  {}  {:<9}  {}",
            view.id,
            view.display,
            view.phase.as_str(),
            view.name
        );
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn run(action: TimerAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let messages = Messages::for_language(&config.language);
    let mut controller = TimerController::new(TimerStore::open_default()?);

    match action {
        TimerAction::Add {
            name,
            hours,
            minutes,
            seconds,
        } => match controller.create(&name, hours, minutes, seconds) {
            Ok(timer) => {
                print_json(&timer.created_event())?;
                eprintln!("{}", messages.timer_created);
            }
            Err(CoreError::Validation(e)) => return Err(messages.validation(&e).into()),
            Err(e) => return Err(e.into()),
        },
        TimerAction::List { json } => {
            if json {
                let views: Vec<TimerView> = controller.list().iter().map(Timer::view).collect();
                print_json(&views)?;
            } else {
                print_table(controller.list(), messages);
            }
        }
        TimerAction::Toggle { id } => {
            let id = resolve_id(controller.list(), &id);
            let name = controller.get(&id).map(|t| t.name().to_string());
            match controller.toggle_running(&id) {
                Ok(Some(event)) => print_json(&event)?,
                Ok(None) => eprintln!("{}", messages.already_completed(&name.unwrap_or_default())),
                Err(CoreError::NotFound(id)) => {
                    warn!(%id, "toggle of unknown timer ignored");
                    eprintln!("{}", messages.timer_not_found);
                }
                Err(e) => return Err(e.into()),
            }
        }
        TimerAction::Delete { id } => {
            let id = resolve_id(controller.list(), &id);
            match controller.delete(&id) {
                Ok(event) => {
                    if let Event::TimerDeleted { name, .. } = &event {
                        eprintln!("{}", messages.deleted(name));
                    }
                    print_json(&event)?;
                }
                Err(CoreError::NotFound(id)) => {
                    warn!(%id, "delete of unknown timer ignored");
                    eprintln!("{}", messages.timer_not_found);
                }
                Err(e) => return Err(e.into()),
            }
        }
        TimerAction::Tick { count } => {
            let emitter = Rc::new(RefCell::new(NotificationEmitter::from_config(config)));
            let mut scheduler = TickScheduler::new(config.tick_interval());
            scheduler.subscribe(Box::new(emitter.clone()));
            scheduler.subscribe(Box::new(EventPrinter));
            for _ in 0..count {
                let report = scheduler.tick(controller.store_mut());
                if !report.completions.is_empty() {
                    if let Some(status) = emitter.borrow().status() {
                        eprintln!("{}", status.text);
                    }
                }
            }
            print_json(&controller.snapshot())?;
        }
        TimerAction::Run { until_idle } => {
            session::run(controller, config, until_idle)?;
        }
    }

    Ok(())
}
