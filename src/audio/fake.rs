//! Scriptable in-memory [`AudioDevice`] for tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use crate::library::Track;

use super::types::{AudioDevice, DeviceError, EndSignal, TrackEnd};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Load(PathBuf),
    Play,
    Pause,
    Unpause,
    Stop,
    SetPosition(Duration),
}

#[derive(Default)]
pub struct FakeDevice {
    pub calls: Vec<Call>,
    pub loaded: Option<PathBuf>,
    pub playing: bool,
    pub volume: f32,
    /// What `position()` reports; tests move it by hand.
    pub position: Duration,
    durations: HashMap<PathBuf, Duration>,
    broken: HashSet<PathBuf>,
    end_tx: Option<mpsc::Sender<TrackEnd>>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, path: impl Into<PathBuf>, duration: Duration) -> Self {
        self.durations.insert(path.into(), duration);
        self
    }

    /// Make `load` fail for `path`.
    pub fn with_broken(mut self, path: impl Into<PathBuf>) -> Self {
        self.broken.insert(path.into());
        self
    }

    /// Let the current track reach its end.
    pub fn finish(&mut self) {
        self.playing = false;
        if let Some(tx) = self.end_tx.take() {
            let _ = tx.send(TrackEnd::Finished);
        }
    }

    /// Make the pending end wait fail.
    pub fn fail(&mut self) {
        if let Some(tx) = self.end_tx.take() {
            let _ = tx.send(TrackEnd::Failed(DeviceError::Disconnected));
        }
    }

    pub fn loads(&self) -> Vec<&Path> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Load(p) => Some(p.as_path()),
                _ => None,
            })
            .collect()
    }
}

impl AudioDevice for FakeDevice {
    fn load(&mut self, track: &Track) -> Result<(), DeviceError> {
        self.calls.push(Call::Load(track.path.clone()));
        // Dropping the sender releases any watcher still waiting on the old track.
        self.end_tx = None;
        if self.broken.contains(&track.path) {
            self.loaded = None;
            return Err(DeviceError::Decode {
                path: track.path.clone(),
                reason: "unsupported".into(),
            });
        }
        self.loaded = Some(track.path.clone());
        self.position = Duration::ZERO;
        Ok(())
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        self.calls.push(Call::Play);
        if self.loaded.is_none() {
            return Err(DeviceError::NotLoaded);
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.calls.push(Call::Pause);
        self.playing = false;
    }

    fn unpause(&mut self) -> Result<(), DeviceError> {
        self.calls.push(Call::Unpause);
        if self.loaded.is_none() {
            return Err(DeviceError::NotLoaded);
        }
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.calls.push(Call::Stop);
        self.end_tx = None;
        self.loaded = None;
        self.playing = false;
        self.position = Duration::ZERO;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_position(&mut self, position: Duration) -> Result<(), DeviceError> {
        self.calls.push(Call::SetPosition(position));
        if self.loaded.is_none() {
            return Err(DeviceError::NotLoaded);
        }
        // Real outputs lag a little behind a seek; the fake does not move
        // the clock at all so tests can tell the two sources apart.
        Ok(())
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn duration(&self, track: &Track) -> Result<Duration, DeviceError> {
        Ok(self
            .durations
            .get(&track.path)
            .copied()
            .unwrap_or(Duration::from_secs(60)))
    }

    fn end_signal(&mut self) -> EndSignal {
        if self.loaded.is_none() {
            return EndSignal::superseded();
        }
        let (tx, rx) = mpsc::channel();
        self.end_tx = Some(tx);
        EndSignal::new(move || rx.recv().unwrap_or(TrackEnd::Superseded))
    }
}
