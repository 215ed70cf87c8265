use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::debug;

use crate::library::Track;

use super::sink::create_sink;
use super::types::{AudioDevice, DeviceError, EndSignal, TrackEnd};

/// The track currently held by the output: its sink plus a flag that goes
/// false as soon as the track is stopped or replaced.
struct Loaded {
    sink: Arc<Sink>,
    live: Arc<AtomicBool>,
}

/// [`AudioDevice`] backed by the default `rodio` output stream.
///
/// The output stream is opened once; every `load` builds a fresh sink on its
/// mixer. Must stay on the thread that opened it.
pub struct RodioDevice {
    stream: OutputStream,
    loaded: Option<Loaded>,
    volume: f32,
    end_poll: Duration,
}

impl RodioDevice {
    pub fn open(end_poll: Duration) -> Result<Self, DeviceError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| DeviceError::NoOutput(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            loaded: None,
            volume: 1.0,
            end_poll,
        })
    }

    fn sink(&self) -> Result<&Sink, DeviceError> {
        self.loaded
            .as_ref()
            .map(|l| l.sink.as_ref())
            .ok_or(DeviceError::NotLoaded)
    }
}

impl AudioDevice for RodioDevice {
    fn load(&mut self, track: &Track) -> Result<(), DeviceError> {
        self.stop();
        let sink = create_sink(&self.stream, track)?;
        sink.set_volume(self.volume);
        debug!(path = %track.path.display(), "loaded track");
        self.loaded = Some(Loaded {
            sink: Arc::new(sink),
            live: Arc::new(AtomicBool::new(true)),
        });
        Ok(())
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        self.sink()?.play();
        Ok(())
    }

    fn pause(&mut self) {
        if let Ok(sink) = self.sink() {
            sink.pause();
        }
    }

    fn unpause(&mut self) -> Result<(), DeviceError> {
        self.play()
    }

    fn stop(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            // Flip the flag first so a watcher seeing the emptied sink knows
            // it was stopped rather than finished.
            loaded.live.store(false, Ordering::Release);
            loaded.sink.stop();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Ok(sink) = self.sink() {
            sink.set_volume(self.volume);
        }
    }

    fn set_position(&mut self, position: Duration) -> Result<(), DeviceError> {
        self.sink()?
            .try_seek(position)
            .map_err(|e| DeviceError::Seek(e.to_string()))
    }

    fn position(&self) -> Duration {
        self.sink().map(|s| s.get_pos()).unwrap_or(Duration::ZERO)
    }

    fn duration(&self, track: &Track) -> Result<Duration, DeviceError> {
        probe_duration(&track.path)
    }

    /// Polls the sink until it drains or the track is replaced.
    ///
    /// rodio gives a `Sink` no way to report a lost output stream, so this
    /// never yields [`TrackEnd::Failed`]. A dead stream stops draining the
    /// sink and the wait lasts until the next `load` or `stop` supersedes it.
    /// Device failures surface through the `Err` returns of `load`, `play`
    /// and `set_position` instead.
    fn end_signal(&mut self) -> EndSignal {
        let Some(loaded) = self.loaded.as_ref() else {
            return EndSignal::superseded();
        };
        let sink = loaded.sink.clone();
        let live = loaded.live.clone();
        let poll = self.end_poll;

        EndSignal::new(move || {
            loop {
                if !live.load(Ordering::Acquire) {
                    return TrackEnd::Superseded;
                }
                if sink.empty() {
                    return if live.load(Ordering::Acquire) {
                        TrackEnd::Finished
                    } else {
                        TrackEnd::Superseded
                    };
                }
                thread::sleep(poll);
            }
        })
    }
}

/// Read the playing time of the file at `path` from its headers.
pub fn probe_duration(path: &Path) -> Result<Duration, DeviceError> {
    let tagged = lofty::read_from_path(path).map_err(|e| DeviceError::Probe {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(tagged.properties().duration())
}
