//! User-initiated timer operations.
//!
//! Each command validates, mutates the store and flushes it before
//! returning, so persisted state never lags by more than one operation.

use chrono::Utc;
use tracing::{debug, info};

use super::model::{Timer, TimerId, TimerView};
use crate::error::{CoreError, Result, ValidationError};
use crate::events::Event;
use crate::storage::TimerStore;

/// Applies create / toggle / delete against an owned [`TimerStore`].
pub struct TimerController {
    store: TimerStore,
}

impl TimerController {
    pub fn new(store: TimerStore) -> Self {
        Self { store }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn store(&self) -> &TimerStore {
        &self.store
    }

    /// Mutable access for the scheduler's tick.
    pub fn store_mut(&mut self) -> &mut TimerStore {
        &mut self.store
    }

    pub fn list(&self) -> &[Timer] {
        self.store.timers()
    }

    pub fn get(&self, id: &TimerId) -> Option<&Timer> {
        self.store.get(id)
    }

    pub fn snapshot(&self) -> Event {
        let timers: Vec<TimerView> = self.list().iter().map(Timer::view).collect();
        let running = timers.iter().filter(|t| t.is_running).count();
        Event::StateSnapshot {
            timers,
            running,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Create an idle timer of `hours:minutes:seconds`.
    ///
    /// # Errors
    /// [`ValidationError::EmptyName`] for an empty or whitespace-only name,
    /// [`ValidationError::NonPositiveDuration`] when the total is zero.
    /// Nothing is mutated on error.
    pub fn create(&mut self, name: &str, hours: u32, minutes: u32, seconds: u32) -> Result<Timer> {
        let duration = validate(name, hours, minutes, seconds)?;

        let mut id = TimerId::generate();
        while self.store.get(&id).is_some() {
            id = TimerId::generate();
        }

        let timer = Timer::new(id, name.to_string(), duration);
        self.store.insert(timer.clone())?;
        self.store.flush();

        info!(id = %timer.id, name = %timer.name, duration, "timer created");
        Ok(timer)
    }

    /// Start a paused timer or pause a running one. `remaining` is untouched.
    ///
    /// Returns `Ok(None)` for a completed timer, which cannot run again.
    ///
    /// # Errors
    /// [`CoreError::NotFound`] when no timer has `id`; nothing changes.
    pub fn toggle_running(&mut self, id: &TimerId) -> Result<Option<Event>> {
        let timer = self
            .store
            .get_mut(id)
            .ok_or_else(|| CoreError::NotFound(id.clone()))?;

        let Some(running) = timer.toggle() else {
            debug!(%id, "toggle ignored, timer already completed");
            return Ok(None);
        };
        let remaining_secs = timer.remaining;
        self.store.flush();

        let at = Utc::now();
        let event = if running {
            info!(%id, remaining_secs, "timer started");
            Event::TimerStarted {
                id: id.clone(),
                remaining_secs,
                at,
            }
        } else {
            info!(%id, remaining_secs, "timer paused");
            Event::TimerPaused {
                id: id.clone(),
                remaining_secs,
                at,
            }
        };
        Ok(Some(event))
    }

    /// Remove a timer in any phase.
    ///
    /// # Errors
    /// [`CoreError::NotFound`] when no timer has `id`; nothing changes.
    pub fn delete(&mut self, id: &TimerId) -> Result<Event> {
        let timer = self
            .store
            .remove(id)
            .ok_or_else(|| CoreError::NotFound(id.clone()))?;
        self.store.flush();

        info!(%id, "timer deleted");
        Ok(Event::TimerDeleted {
            id: timer.id,
            name: timer.name,
            at: Utc::now(),
        })
    }
}

/// Total seconds for a valid request.
fn validate(
    name: &str,
    hours: u32,
    minutes: u32,
    seconds: u32,
) -> std::result::Result<u64, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let total = u64::from(hours) * 3600 + u64::from(minutes) * 60 + u64::from(seconds);
    if total == 0 {
        return Err(ValidationError::NonPositiveDuration);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerPhase;

    fn controller() -> TimerController {
        TimerController::new(TimerStore::in_memory().unwrap())
    }

    #[test]
    fn create_sums_hours_minutes_seconds() {
        let mut c = controller();
        let timer = c.create("Exam", 1, 2, 3).unwrap();
        assert_eq!(timer.duration(), 3723);
        assert_eq!(timer.remaining(), 3723);
        assert!(!timer.is_running());
        assert_eq!(c.list().len(), 1);
    }

    #[test]
    fn created_event_describes_the_new_timer() {
        let mut c = controller();
        let timer = c.create("Study", 0, 1, 30).unwrap();
        match timer.created_event() {
            Event::TimerCreated {
                id,
                name,
                duration_secs,
                ..
            } => {
                assert_eq!(&id, timer.id());
                assert_eq!(name, "Study");
                assert_eq!(duration_secs, 90);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn create_persists_immediately() {
        let mut c = controller();
        let timer = c.create("Study", 0, 0, 5).unwrap();
        assert_eq!(c.store().load(), vec![timer]);
    }

    #[test]
    fn create_rejects_blank_names_and_zero_duration() {
        let mut c = controller();
        for name in ["", "   ", "\t\n"] {
            assert!(matches!(
                c.create(name, 0, 0, 10),
                Err(CoreError::Validation(ValidationError::EmptyName))
            ));
        }
        assert!(matches!(
            c.create("Break", 0, 0, 0),
            Err(CoreError::Validation(ValidationError::NonPositiveDuration))
        ));
        assert!(c.list().is_empty());
        assert!(c.store().load().is_empty());
    }

    #[test]
    fn create_keeps_name_verbatim() {
        let mut c = controller();
        let timer = c.create("  Deep work ", 0, 25, 0).unwrap();
        assert_eq!(timer.name(), "  Deep work ");
    }

    #[test]
    fn create_assigns_distinct_ids() {
        let mut c = controller();
        let a = c.create("A", 0, 0, 1).unwrap();
        let b = c.create("B", 0, 0, 1).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn toggle_flips_without_touching_remaining() {
        let mut c = controller();
        let id = c.create("Study", 0, 1, 0).unwrap().id().clone();

        let started = c.toggle_running(&id).unwrap();
        assert!(matches!(started, Some(Event::TimerStarted { remaining_secs: 60, .. })));
        assert_eq!(c.get(&id).unwrap().phase(), TimerPhase::Running);

        let paused = c.toggle_running(&id).unwrap();
        assert!(matches!(paused, Some(Event::TimerPaused { remaining_secs: 60, .. })));
        assert_eq!(c.get(&id).unwrap().remaining(), 60);
        assert!(!c.store().load()[0].is_running());
    }

    #[test]
    fn toggle_unknown_id_is_not_found() {
        let mut c = controller();
        c.create("Study", 0, 0, 5).unwrap();
        let before = c.list().to_vec();
        let err = c.toggle_running(&TimerId::from("missing")).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert_eq!(c.list(), before.as_slice());
    }

    #[test]
    fn delete_removes_only_the_target() {
        let mut c = controller();
        let a = c.create("A", 0, 0, 1).unwrap();
        let b = c.create("B", 0, 0, 2).unwrap();
        let d = c.create("C", 0, 0, 3).unwrap();

        let event = c.delete(b.id()).unwrap();
        assert!(matches!(event, Event::TimerDeleted { ref name, .. } if name == "B"));
        assert_eq!(c.list(), &[a.clone(), d.clone()]);
        assert_eq!(c.store().load(), vec![a, d]);

        assert!(matches!(c.delete(b.id()), Err(CoreError::NotFound(_))));
        assert_eq!(c.list().len(), 2);
    }

    #[test]
    fn snapshot_counts_running_timers() {
        let mut c = controller();
        let a = c.create("A", 0, 0, 10).unwrap();
        c.create("B", 0, 0, 10).unwrap();
        c.toggle_running(a.id()).unwrap();
        match c.snapshot() {
            Event::StateSnapshot { timers, running, .. } => {
                assert_eq!(timers.len(), 2);
                assert_eq!(running, 1);
                assert_eq!(timers[0].display, "00:00:10");
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }
}
