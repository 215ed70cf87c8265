//! Audio transport contract and its small companion types.
//!
//! The controller drives any [`AudioDevice`]; the production one is
//! [`super::RodioDevice`].

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::library::Track;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no audio output available: {0}")]
    NoOutput(String),
    #[error("cannot open {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("cannot decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("cannot read duration of {path}: {reason}")]
    Probe { path: PathBuf, reason: String },
    #[error("seek failed: {0}")]
    Seek(String),
    #[error("no track loaded")]
    NotLoaded,
    #[error("audio output disconnected")]
    Disconnected,
}

/// How a wait on an [`EndSignal`] finished.
#[derive(Debug)]
pub enum TrackEnd {
    /// The track played to its end.
    Finished,
    /// Another load or a stop replaced the track first.
    Superseded,
    /// The device failed while we were waiting.
    ///
    /// Only backends that can observe output loss report this. A backend
    /// that cannot resolves the wait with `Superseded` once the track is
    /// stopped or replaced.
    Failed(DeviceError),
}

/// One-shot, blocking "the current track is done" notification.
///
/// Handed out by [`AudioDevice::end_signal`] right after a track starts and
/// consumed by a watcher thread.
pub struct EndSignal {
    wait: Box<dyn FnOnce() -> TrackEnd + Send>,
}

impl EndSignal {
    pub fn new<F>(wait: F) -> Self
    where
        F: FnOnce() -> TrackEnd + Send + 'static,
    {
        Self {
            wait: Box::new(wait),
        }
    }

    /// A signal for a track that is already gone.
    pub fn superseded() -> Self {
        Self::new(|| TrackEnd::Superseded)
    }

    /// Block until the track finishes, is replaced, or the device fails.
    pub fn wait(self) -> TrackEnd {
        (self.wait)()
    }
}

/// Transport capabilities the playback controller needs.
///
/// `stop` must be safe to call when nothing is loaded.
pub trait AudioDevice {
    fn load(&mut self, track: &Track) -> Result<(), DeviceError>;
    fn play(&mut self) -> Result<(), DeviceError>;
    fn pause(&mut self);
    fn unpause(&mut self) -> Result<(), DeviceError>;
    fn stop(&mut self);
    /// Output gain, 0.0 (silent) to 1.0.
    fn set_volume(&mut self, volume: f32);
    fn set_position(&mut self, position: Duration) -> Result<(), DeviceError>;
    /// Playhead of the loaded track as the device sees it.
    fn position(&self) -> Duration;
    fn duration(&self, track: &Track) -> Result<Duration, DeviceError>;
    /// End notification for the track loaded right now.
    ///
    /// [`TrackEnd::Failed`] is optional; see its docs.
    fn end_signal(&mut self) -> EndSignal;
}
