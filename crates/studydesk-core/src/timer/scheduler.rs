//! Shared tick source for all timers.
//!
//! `tick()` is the only place `remaining` changes. It is synchronous so the
//! caller can drive it deterministically; `start()` wraps it in a tokio
//! interval for real use.
//!
//! ## Usage
//!
//! ```ignore
//! let mut scheduler = TickScheduler::new(Duration::from_secs(1));
//! scheduler.subscribe(Box::new(emitter));
//! let mut ticks = scheduler.start();
//! while ticks.next().await.is_some() {
//!     scheduler.tick(controller.store_mut());
//! }
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use super::model::Advance;
use crate::events::Completion;
use crate::storage::TimerStore;

/// Receives completion events raised by [`TickScheduler::tick`].
pub trait CompletionObserver {
    fn on_completion(&mut self, completion: &Completion);
}

impl<O: CompletionObserver + ?Sized> CompletionObserver for Rc<RefCell<O>> {
    fn on_completion(&mut self, completion: &Completion) {
        self.borrow_mut().on_completion(completion);
    }
}

/// What one tick did.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Scheduler tick number, starting at 1.
    pub tick: u64,
    /// Timers that changed on this tick (decremented or completed).
    pub advanced: usize,
    pub completions: Vec<Completion>,
    /// Whether the batch was written out. False for idle ticks.
    pub persisted: bool,
}

impl TickReport {
    pub fn changed(&self) -> bool {
        self.advanced > 0
    }
}

pub struct TickScheduler {
    period: Duration,
    ticks: u64,
    observers: Vec<Box<dyn CompletionObserver>>,
    stop_tx: watch::Sender<bool>,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            period,
            ticks: 0,
            observers: Vec::new(),
            stop_tx,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of ticks applied so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Register an observer. Observers are called in registration order.
    pub fn subscribe(&mut self, observer: Box<dyn CompletionObserver>) {
        self.observers.push(observer);
    }

    /// Advance every running timer by one second as a single batch.
    ///
    /// A timer that reaches zero stops running in the same step and is
    /// reported once; later ticks skip it. The store is flushed only when
    /// something changed.
    pub fn tick(&mut self, store: &mut TimerStore) -> TickReport {
        self.ticks += 1;
        let at = Utc::now();
        let mut advanced = 0;
        let mut completions = Vec::new();

        for timer in store.iter_mut() {
            match timer.advance() {
                Advance::Skipped => {}
                Advance::Decremented => advanced += 1,
                Advance::Completed => {
                    advanced += 1;
                    completions.push(Completion {
                        id: timer.id.clone(),
                        name: timer.name.clone(),
                        duration_secs: timer.duration,
                        tick: self.ticks,
                        at,
                    });
                }
            }
        }

        let persisted = advanced > 0 && store.flush();

        for completion in &completions {
            info!(id = %completion.id, name = %completion.name, "timer completed");
            for observer in &mut self.observers {
                observer.on_completion(completion);
            }
        }

        if advanced > 0 {
            debug!(tick = self.ticks, advanced, persisted, "tick applied");
        }

        TickReport {
            tick: self.ticks,
            advanced,
            completions,
            persisted,
        }
    }

    /// Arm the scheduler and return its tick stream.
    ///
    /// Must be called inside a tokio runtime. Clears a previous stop.
    pub fn start(&self) -> Ticks {
        self.stop_tx.send_replace(false);
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(period_ms = self.period.as_millis() as u64, "tick scheduler started");
        Ticks {
            interval,
            stop_rx: self.stop_tx.subscribe(),
        }
    }

    /// Halt future ticks. Timer state is left as the last tick left it.
    pub fn stop(&self) {
        if !self.stop_tx.send_replace(true) {
            debug!(ticks = self.ticks, "tick scheduler stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }

    /// Handle that can stop the scheduler from elsewhere.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stop_tx: self.stop_tx.clone(),
        }
    }
}

#[derive(Clone)]
pub struct StopHandle {
    stop_tx: watch::Sender<bool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }
}

/// Periodic tick stream returned by [`TickScheduler::start`].
///
/// Late ticks are delayed rather than bursted, so work for one tick never
/// overlaps the next.
pub struct Ticks {
    interval: Interval,
    stop_rx: watch::Receiver<bool>,
}

impl Ticks {
    /// Wait for the next tick. `None` once the scheduler is stopped.
    pub async fn next(&mut self) -> Option<Instant> {
        loop {
            if *self.stop_rx.borrow_and_update() {
                return None;
            }
            tokio::select! {
                biased;
                changed = self.stop_rx.changed() => {
                    if changed.is_err() {
                        return None;
                    }
                }
                at = self.interval.tick() => return Some(at),
            }
        }
    }
}
