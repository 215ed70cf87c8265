//! Error type shared by the library and the playback controller.

use std::io;

use thiserror::Error;

use crate::audio::DeviceError;
use crate::library::FetchError;
use crate::playback::Status;

/// Every way a user intent can be rejected.
///
/// Apart from `Device`, a rejected operation leaves player state exactly as
/// it was before the call.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("no playable tracks found")]
    EmptySelection,
    #[error("no tracks match '{term}'")]
    NoResults { term: String },
    #[error("track {index} is out of range ({len} visible)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("cannot {action} while {from}")]
    InvalidTransition { from: Status, action: &'static str },
    #[error("no track in that direction")]
    NoAdjacentTrack,
    #[error("download failed: {0}")]
    FetchFailed(#[from] FetchError),
    #[error("audio device error: {0}")]
    Device(#[from] DeviceError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl PlayerError {
    /// Whether the error is expected user feedback rather than a fault.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            Self::NoResults { .. } | Self::NoAdjacentTrack | Self::InvalidTransition { .. }
        )
    }
}
