use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Transport status of the player.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Stopped => "stopped",
            Status::Playing => "playing",
            Status::Paused => "paused",
        })
    }
}

/// Identifies one "this track is loaded and playing" episode.
///
/// Asynchronous notifications carry the session they were created for and
/// are dropped when it no longer matches the controller's.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub generation: u64,
    pub track: PathBuf,
}

/// Everything the controller knows about playback.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackState {
    pub status: Status,
    /// Position in the library view of the active (or last) track.
    pub current_index: usize,
    pub repeat_one: bool,
    /// Always equal to `volume == 0`.
    pub muted: bool,
    /// 0-100.
    pub volume: u8,
    /// Position requested by the last seek, reported once by the next sample.
    pub elapsed_override: Option<Duration>,
    pub session: Option<Session>,
    /// Length of the loaded track.
    pub duration: Duration,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            status: Status::Stopped,
            current_index: 0,
            repeat_one: false,
            muted: false,
            volume: 100,
            elapsed_override: None,
            session: None,
            duration: Duration::ZERO,
        }
    }
}

/// Display-facing notifications produced by controller operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    TrackChanged { index: usize, name: String },
    StatusChanged(Status),
}

/// Step through the view.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn step(self, index: usize) -> Option<usize> {
        match self {
            Direction::Forward => index.checked_add(1),
            Direction::Backward => index.checked_sub(1),
        }
    }
}

/// Where a seek should land.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SeekTarget {
    /// Share of the track length, e.g. a click position over the bar width.
    Fraction(f64),
    /// Absolute offset from the start.
    Position(Duration),
    /// Relative scrub from the current playhead.
    Forward(Duration),
    Backward(Duration),
}
