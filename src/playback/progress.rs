//! Periodic progress sampling.
//!
//! The ticker thread only wakes the control thread; the sample itself is
//! taken there, against the controller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::audio::AudioDevice;
use crate::events::PlayerEvent;

use super::controller::PlaybackController;
use super::state::Status;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    pub elapsed: Duration,
    pub total: Duration,
}

impl Progress {
    /// Share of the track already played, in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        if self.total.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / self.total.as_secs_f64()).clamp(0.0, 1.0)
    }
}

pub struct ProgressReporter {
    interval: Duration,
    armed: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    ticker: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            armed: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(AtomicBool::new(false)),
            ticker: None,
        }
    }

    /// Spawn the ticker. It sends [`PlayerEvent::Tick`] every interval while
    /// armed and exits on shutdown or once the receiver is gone.
    pub fn start(&mut self, events: Sender<PlayerEvent>) {
        if self.ticker.is_some() {
            return;
        }
        let interval = self.interval;
        let armed = self.armed.clone();
        let shutdown = self.shutdown.clone();

        self.ticker = Some(thread::spawn(move || {
            while !shutdown.load(Ordering::Acquire) {
                thread::sleep(interval);
                if armed.load(Ordering::Acquire) && events.send(PlayerEvent::Tick).is_err() {
                    break;
                }
            }
            debug!("progress ticker stopped");
        }));
    }

    /// Arm the ticker while playing, disarm it otherwise.
    pub fn observe(&self, status: Status) {
        self.armed.store(status == Status::Playing, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Elapsed and total time of the playing track. `None` unless playing.
    ///
    /// A pending seek target is reported exactly once; after that the device
    /// clock takes over again.
    pub fn sample<D: AudioDevice>(&self, controller: &mut PlaybackController<D>) -> Option<Progress> {
        if controller.status() != Status::Playing {
            return None;
        }
        let elapsed = controller
            .take_elapsed_override()
            .unwrap_or_else(|| controller.device_position());
        Some(Progress {
            elapsed,
            total: controller.state().duration,
        })
    }

    pub fn shutdown(&mut self) {
        self.armed.store(false, Ordering::Release);
        self.shutdown.store(true, Ordering::Release);
        if let Some(ticker) = self.ticker.take() {
            let _ = ticker.join();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.shutdown();
    }
}
