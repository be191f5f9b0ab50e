mod controller;
mod model;
mod scheduler;

pub use controller::TimerController;
pub use model::{format_hms, Timer, TimerId, TimerPhase, TimerView};
pub use scheduler::{CompletionObserver, StopHandle, TickReport, TickScheduler, Ticks};
