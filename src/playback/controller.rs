use std::mem;
use std::sync::mpsc::Sender;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::audio::{AudioDevice, DeviceError};
use crate::error::PlayerError;
use crate::events::PlayerEvent;
use crate::library::{Library, Track};

use super::state::{Direction, Notice, PlaybackState, SeekTarget, Session, Status};
use super::watcher::spawn_end_watcher;

/// Owns the audio device and every piece of playback state.
///
/// All transport commands go through here, one at a time, on the control
/// thread. Background work (end watchers) only ever reaches the controller
/// through [`PlayerEvent`]s, and their session tags are checked before they
/// have any effect.
pub struct PlaybackController<D: AudioDevice> {
    device: D,
    state: PlaybackState,
    generation: u64,
    /// Volume to come back to when unmuting. Never zero.
    restore_volume: u8,
    events: Sender<PlayerEvent>,
    notices: Vec<Notice>,
}

impl<D: AudioDevice> PlaybackController<D> {
    pub fn new(device: D, events: Sender<PlayerEvent>) -> Self {
        Self {
            device,
            state: PlaybackState::default(),
            generation: 0,
            restore_volume: 100,
            events,
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.state.status
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn snapshot(&self) -> PlaybackState {
        self.state.clone()
    }

    /// Drain the display notifications produced since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        mem::take(&mut self.notices)
    }

    /// Load and start the track at `index` of the current view.
    pub fn play_index(&mut self, library: &Library, index: usize) -> Result<(), PlayerError> {
        let Some(track) = library.view_get(index).cloned() else {
            let len = library.view_len();
            warn!(index, len, "play rejected: index out of range");
            return Err(PlayerError::IndexOutOfRange { index, len });
        };

        self.device.stop();
        let duration = match self.start(&track) {
            Ok(duration) => duration,
            Err(error) => {
                warn!(path = %track.path.display(), %error, "failed to start track");
                self.halt();
                return Err(error.into());
            }
        };

        self.generation += 1;
        let session = Session {
            generation: self.generation,
            track: track.path.clone(),
        };
        self.state.status = Status::Playing;
        self.state.current_index = index;
        self.state.duration = duration;
        self.state.elapsed_override = None;
        self.state.session = Some(session.clone());

        info!(index, name = %track.name, generation = self.generation, "playing");
        self.notices.push(Notice::TrackChanged {
            index,
            name: track.name.clone(),
        });
        self.notices.push(Notice::StatusChanged(Status::Playing));

        spawn_end_watcher(self.device.end_signal(), session, self.events.clone());
        Ok(())
    }

    fn start(&mut self, track: &Track) -> Result<Duration, DeviceError> {
        self.device.load(track)?;
        let duration = self.device.duration(track)?;
        self.device.play()?;
        debug!(path = %track.path.display(), ?duration, "device started");
        Ok(duration)
    }

    pub fn resume(&mut self) -> Result<(), PlayerError> {
        if self.state.status != Status::Paused {
            return Err(self.reject("resume"));
        }
        if let Err(error) = self.device.unpause() {
            warn!(%error, "failed to resume");
            self.halt();
            return Err(error.into());
        }
        self.set_status(Status::Playing);
        Ok(())
    }

    /// Pause if playing; does nothing in any other state.
    pub fn pause(&mut self) {
        if self.state.status == Status::Playing {
            self.device.pause();
            self.set_status(Status::Paused);
        }
    }

    /// Stop the device and forget the loaded track. Safe to repeat.
    pub fn stop(&mut self) {
        self.device.stop();
        self.state.session = None;
        self.state.elapsed_override = None;
        self.set_status(Status::Stopped);
    }

    /// Play the neighbour of the current track in the view.
    pub fn advance(&mut self, library: &Library, direction: Direction) -> Result<(), PlayerError> {
        let target = direction
            .step(self.state.current_index)
            .filter(|&index| index < library.view_len())
            .ok_or(PlayerError::NoAdjacentTrack)?;
        self.stop();
        self.play_index(library, target)
    }

    pub fn seek(&mut self, target: SeekTarget) -> Result<(), PlayerError> {
        if self.state.status != Status::Playing {
            return Err(self.reject("seek"));
        }
        let duration = self.state.duration;
        let position = match target {
            SeekTarget::Fraction(fraction) => {
                let fraction = if fraction.is_nan() {
                    0.0
                } else {
                    fraction.clamp(0.0, 1.0)
                };
                duration.mul_f64(fraction)
            }
            SeekTarget::Position(position) => self.clamp_elapsed(position),
            SeekTarget::Forward(delta) => self.clamp_elapsed(self.elapsed().saturating_add(delta)),
            SeekTarget::Backward(delta) => self.elapsed().saturating_sub(delta),
        };

        self.device.set_position(position)?;
        debug!(?position, "seek");
        self.state.elapsed_override = Some(position);
        Ok(())
    }

    /// Scrub relative to the playhead.
    pub fn seek_by(&mut self, delta: Duration, direction: Direction) -> Result<(), PlayerError> {
        self.seek(match direction {
            Direction::Forward => SeekTarget::Forward(delta),
            Direction::Backward => SeekTarget::Backward(delta),
        })
    }

    /// Set the volume (clamped to 0-100). Zero mutes.
    pub fn set_volume(&mut self, volume: i32) {
        let volume = volume.clamp(0, 100) as u8;
        if volume == 0 {
            if self.state.volume > 0 {
                self.restore_volume = self.state.volume;
            }
        } else {
            self.restore_volume = volume;
        }
        self.state.volume = volume;
        self.state.muted = volume == 0;
        self.device.set_volume(f32::from(volume) / 100.0);
        debug!(volume, muted = self.state.muted, "volume");
    }

    pub fn adjust_volume(&mut self, delta: i32) {
        self.set_volume(i32::from(self.state.volume) + delta);
    }

    pub fn toggle_mute(&mut self) -> bool {
        if self.state.muted {
            self.set_volume(i32::from(self.restore_volume));
        } else {
            self.set_volume(0);
        }
        self.state.muted
    }

    pub fn toggle_repeat(&mut self) -> bool {
        self.state.repeat_one = !self.state.repeat_one;
        info!(repeat_one = self.state.repeat_one, "repeat toggled");
        self.state.repeat_one
    }

    /// The loaded track played to its end.
    ///
    /// Events from an older session, or arriving after the user already
    /// paused or stopped, are ignored.
    pub fn on_track_ended(&mut self, library: &Library, session: &Session) -> Result<(), PlayerError> {
        if !self.is_current(session) || self.state.status != Status::Playing {
            debug!(generation = session.generation, "ignoring stale track end");
            return Ok(());
        }
        if self.state.repeat_one {
            let index = self.state.current_index;
            info!(index, "repeating track");
            return self.play_index(library, index).inspect_err(|_| self.stop());
        }
        info!(index = self.state.current_index, "track finished");
        self.stop();
        Ok(())
    }

    /// A watcher lost the device while waiting for `session` to end.
    pub fn on_device_lost(&mut self, session: &Session, error: DeviceError) -> Result<(), PlayerError> {
        if !self.is_current(session) {
            debug!(generation = session.generation, %error, "ignoring stale device error");
            return Ok(());
        }
        warn!(%error, "audio device lost");
        self.stop();
        Err(error.into())
    }

    /// Re-point the current index after the view changed.
    ///
    /// While a track is loaded the index follows it to its new position;
    /// otherwise, or when it left the view, the index is clamped.
    pub fn follow_view(&mut self, library: &Library) {
        let position = self
            .state
            .session
            .as_ref()
            .and_then(|session| library.view_position(&session.track));
        match position {
            Some(index) => self.state.current_index = index,
            None => self.clamp_to_view(library.view_len()),
        }
    }

    pub fn clamp_to_view(&mut self, len: usize) {
        self.state.current_index = self.state.current_index.min(len.saturating_sub(1));
    }

    pub fn reset_index(&mut self) {
        self.state.current_index = 0;
    }

    /// Elapsed time of the loaded track as the controller sees it: a pending
    /// seek target wins over the device clock.
    pub fn elapsed(&self) -> Duration {
        self.state
            .elapsed_override
            .unwrap_or_else(|| self.clamp_elapsed(self.device.position()))
    }

    pub(super) fn take_elapsed_override(&mut self) -> Option<Duration> {
        self.state.elapsed_override.take()
    }

    pub(super) fn device_position(&self) -> Duration {
        self.clamp_elapsed(self.device.position())
    }

    pub fn shutdown(&mut self) {
        self.stop();
        self.state.current_index = 0;
        self.state.duration = Duration::ZERO;
        info!("playback shut down");
    }

    fn clamp_elapsed(&self, position: Duration) -> Duration {
        // An unknown length is reported as zero; don't pin the playhead to it.
        if self.state.duration.is_zero() {
            position
        } else {
            position.min(self.state.duration)
        }
    }

    fn is_current(&self, session: &Session) -> bool {
        self.state.session.as_ref() == Some(session)
    }

    /// Leave the device and state stopped after a device failure.
    fn halt(&mut self) {
        self.device.stop();
        self.state.session = None;
        self.state.elapsed_override = None;
        self.state.duration = Duration::ZERO;
        self.set_status(Status::Stopped);
    }

    fn set_status(&mut self, status: Status) {
        if self.state.status != status {
            info!(from = %self.state.status, to = %status, "status");
            self.state.status = status;
            self.notices.push(Notice::StatusChanged(status));
        }
    }

    fn reject(&self, action: &'static str) -> PlayerError {
        warn!(action, status = %self.state.status, "rejected");
        PlayerError::InvalidTransition {
            from: self.state.status,
            action,
        }
    }

    #[cfg(test)]
    pub(crate) fn device(&self) -> &D {
        &self.device
    }

    #[cfg(test)]
    pub(crate) fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}
