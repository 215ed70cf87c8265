//! Messages sent from background threads to the control thread.
//!
//! Watchers, the progress ticker and downloads never touch player state
//! directly; they post one of these and the event loop applies it.

use std::path::PathBuf;

use crate::audio::DeviceError;
use crate::library::FetchError;
use crate::playback::Session;

#[derive(Debug)]
pub enum PlayerEvent {
    /// Time to take a progress sample.
    Tick,
    /// The track loaded for `Session` played to its end.
    TrackEnded(Session),
    /// Waiting for the end of `session` failed; treated as a stop.
    DeviceLost { session: Session, error: DeviceError },
    /// A remote download finished.
    Fetched {
        url: String,
        result: Result<PathBuf, FetchError>,
    },
}
