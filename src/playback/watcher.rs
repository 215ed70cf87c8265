//! End-of-track watcher threads.
//!
//! One watcher is spawned per started track. It blocks on the device's
//! [`EndSignal`] and forwards the outcome, tagged with its session, to the
//! control thread. A superseded wait ends quietly; anything else is checked
//! against the current session by the controller before it has any effect.

use std::sync::mpsc::Sender;
use std::thread;

use tracing::{debug, warn};

use crate::audio::{EndSignal, TrackEnd};
use crate::events::PlayerEvent;

use super::state::Session;

pub(super) fn spawn_end_watcher(
    signal: EndSignal,
    session: Session,
    events: Sender<PlayerEvent>,
) {
    thread::spawn(move || {
        let event = match signal.wait() {
            TrackEnd::Finished => PlayerEvent::TrackEnded(session),
            TrackEnd::Superseded => {
                debug!(generation = session.generation, "end watcher superseded");
                return;
            }
            TrackEnd::Failed(error) => {
                warn!(generation = session.generation, %error, "end watcher failed");
                PlayerEvent::DeviceLost { session, error }
            }
        };
        // The receiver is gone only when the player is shutting down.
        let _ = events.send(event);
    });
}
