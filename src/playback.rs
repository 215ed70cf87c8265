//! Playback state machine, progress sampling and end-of-track watching.

mod controller;
mod progress;
mod state;
mod watcher;

pub use controller::PlaybackController;
pub use progress::{Progress, ProgressReporter};
pub use state::{Direction, Notice, PlaybackState, SeekTarget, Session, Status};
