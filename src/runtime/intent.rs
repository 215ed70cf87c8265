//! User intents and the control-thread context that applies them.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::app::{App, InputMode};
use crate::audio::AudioDevice;
use crate::config::Settings;
use crate::error::PlayerError;
use crate::events::PlayerEvent;
use crate::library::{Fetch, Library, Track, spawn_fetch};
use crate::playback::{
    Direction, Notice, PlaybackController, ProgressReporter, SeekTarget, Status,
};

/// Everything a key press can ask for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Quit,
    CursorDown,
    CursorUp,
    CursorTop,
    CursorBottom,
    PlaySelected,
    PlayPause,
    Stop,
    Next,
    Prev,
    Scrub(Direction),
    /// Seek to `n` tenths of the track.
    SeekTenth(u8),
    VolumeUp,
    VolumeDown,
    ToggleMute,
    ToggleRepeat,
    Shuffle,
    BeginInput(InputMode),
    InputChar(char),
    InputBackspace,
    SubmitInput,
    CancelInput,
}

/// Owns the library, the controller and the UI model on the control thread.
pub struct Player<D: AudioDevice> {
    pub library: Library,
    pub controller: PlaybackController<D>,
    pub reporter: ProgressReporter,
    pub app: App,
    fetcher: Arc<dyn Fetch>,
    events: Sender<PlayerEvent>,
    settings: Settings,
}

impl<D: AudioDevice> Player<D> {
    pub fn new(
        device: D,
        fetcher: Arc<dyn Fetch>,
        events: Sender<PlayerEvent>,
        settings: Settings,
    ) -> Self {
        Self {
            library: Library::new(&settings.library.extensions),
            controller: PlaybackController::new(device, events.clone()),
            reporter: ProgressReporter::new(Duration::from_millis(
                settings.playback.progress_interval_ms,
            )),
            app: App::new(Duration::from_millis(settings.controls.notice_ms)),
            fetcher,
            events,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn start_ticker(&mut self) {
        self.reporter.start(self.events.clone());
    }

    /// Apply one intent. Returns `true` when the player should quit.
    pub fn apply(&mut self, intent: Intent, now: Instant) -> bool {
        let result = match intent {
            Intent::Quit => return true,
            Intent::CursorDown => {
                self.app.next(self.library.view_len());
                Ok(())
            }
            Intent::CursorUp => {
                self.app.prev();
                Ok(())
            }
            Intent::CursorTop => {
                self.app.top();
                Ok(())
            }
            Intent::CursorBottom => {
                self.app.bottom(self.library.view_len());
                Ok(())
            }
            Intent::PlaySelected => self.play_selected(),
            Intent::PlayPause => match self.controller.status() {
                Status::Playing => {
                    self.controller.pause();
                    Ok(())
                }
                Status::Paused => self.controller.resume(),
                Status::Stopped => self.play_selected(),
            },
            Intent::Stop => {
                self.controller.stop();
                Ok(())
            }
            Intent::Next => self.controller.advance(&self.library, Direction::Forward),
            Intent::Prev => self.controller.advance(&self.library, Direction::Backward),
            Intent::Scrub(direction) => {
                let step = Duration::from_secs(self.settings.controls.scrub_seconds);
                self.controller.seek_by(step, direction)
            }
            Intent::SeekTenth(n) => self
                .controller
                .seek(SeekTarget::Fraction(f64::from(n.min(10)) / 10.0)),
            Intent::VolumeUp => {
                self.controller
                    .adjust_volume(i32::from(self.settings.controls.volume_step));
                Ok(())
            }
            Intent::VolumeDown => {
                self.controller
                    .adjust_volume(-i32::from(self.settings.controls.volume_step));
                Ok(())
            }
            Intent::ToggleMute => {
                self.controller.toggle_mute();
                Ok(())
            }
            Intent::ToggleRepeat => {
                self.controller.toggle_repeat();
                Ok(())
            }
            Intent::Shuffle => {
                self.shuffle(now);
                Ok(())
            }
            Intent::BeginInput(mode) => {
                let initial = match mode {
                    InputMode::Search => self.library.query().to_string(),
                    _ => String::new(),
                };
                self.app.begin_input(mode, &initial);
                Ok(())
            }
            Intent::InputChar(c) => {
                self.app.push_input(c);
                self.search_as_you_type()
            }
            Intent::InputBackspace => {
                self.app.pop_input();
                self.search_as_you_type()
            }
            Intent::SubmitInput => self.submit_input(now),
            Intent::CancelInput => self.cancel_input(),
        };

        self.report(result, now);
        self.flush();
        false
    }

    /// Apply a message from a background thread.
    pub fn handle_event(&mut self, event: PlayerEvent, now: Instant) {
        let result = match event {
            PlayerEvent::Tick => {
                if let Some(progress) = self.reporter.sample(&mut self.controller) {
                    self.app.record_progress(progress);
                }
                Ok(())
            }
            PlayerEvent::TrackEnded(session) => {
                self.controller.on_track_ended(&self.library, &session)
            }
            PlayerEvent::DeviceLost { session, error } => {
                self.controller.on_device_lost(&session, error)
            }
            PlayerEvent::Fetched { url, result } => match result {
                Ok(path) => {
                    let track = Track::from_path(path);
                    info!(%url, name = %track.name, "remote track added");
                    self.app.flash_info(format!("added {}", track.name), now);
                    self.library.append_remote(track);
                    Ok(())
                }
                Err(e) => Err(PlayerError::FetchFailed(e)),
            },
        };
        self.report(result, now);
        self.flush();
    }

    /// Replace the library with the tracks in `dir`.
    ///
    /// On failure the old library (and playback) stay as they were.
    pub fn open_dir(&mut self, dir: PathBuf, now: Instant) {
        match self.library.load_dir(&dir, &self.settings.library) {
            Ok(count) => {
                self.controller.stop();
                self.controller.reset_index();
                self.app.top();
                self.app.clear_now_playing();
                self.app.set_current_dir(dir.display().to_string());
                self.app.flash_info(format!("loaded {count} tracks"), now);
            }
            Err(e) => {
                if self.app.current_dir.is_none() {
                    self.app.set_current_dir(dir.display().to_string());
                }
                self.report(Err(e), now);
            }
        }
        self.flush();
    }

    pub fn shuffle(&mut self, now: Instant) {
        self.library.shuffle(&mut rand::rng());
        self.controller.reset_index();
        self.app.top();
        self.app.flash_info("shuffled", now);
    }

    /// Push controller notices to the reporter and the UI model.
    pub fn flush(&mut self) {
        for notice in self.controller.take_notices() {
            if let Notice::StatusChanged(status) = notice {
                self.reporter.observe(status);
            }
            self.app.apply_notice(&notice);
        }
        self.app.sync(self.controller.state());
        self.app.clamp_selection(self.library.view_len());
    }

    pub fn shutdown(&mut self) {
        self.controller.shutdown();
        self.reporter.shutdown();
        self.flush();
    }

    fn play_selected(&mut self) -> Result<(), PlayerError> {
        if self.library.view_len() == 0 {
            let query = self.library.query();
            if !query.is_empty() {
                return Err(PlayerError::NoResults {
                    term: query.to_string(),
                });
            }
            return Err(PlayerError::EmptySelection);
        }
        self.controller.play_index(&self.library, self.app.selected)
    }

    fn search_as_you_type(&mut self) -> Result<(), PlayerError> {
        if self.app.mode != InputMode::Search {
            return Ok(());
        }
        let result = self.library.filter(&self.app.input).map(|_| ());
        self.after_view_change();
        result
    }

    fn after_view_change(&mut self) {
        self.controller.follow_view(&self.library);
        self.app.top();
    }

    fn submit_input(&mut self, now: Instant) -> Result<(), PlayerError> {
        let mode = self.app.mode;
        let input = self.app.finish_input();
        let input = input.trim();
        match mode {
            InputMode::Normal | InputMode::Search => Ok(()),
            InputMode::OpenDir if input.is_empty() => Ok(()),
            InputMode::OpenDir => {
                self.open_dir(PathBuf::from(input), now);
                Ok(())
            }
            InputMode::Url if input.is_empty() => Ok(()),
            InputMode::Url => {
                debug!(url = input, "fetching");
                self.app.flash_info(format!("downloading {input}"), now);
                spawn_fetch(self.fetcher.clone(), input.to_string(), self.events.clone());
                Ok(())
            }
        }
    }

    fn cancel_input(&mut self) -> Result<(), PlayerError> {
        let mode = self.app.mode;
        self.app.finish_input();
        if mode == InputMode::Search && !self.library.query().is_empty() {
            let result = self.library.filter("").map(|_| ());
            self.after_view_change();
            return result;
        }
        Ok(())
    }

    fn report(&mut self, result: Result<(), PlayerError>, now: Instant) {
        let Err(e) = result else {
            return;
        };
        if e.is_benign() {
            debug!(error = %e, "intent rejected");
        } else {
            warn!(error = %e, "intent failed");
        }
        self.app.flash_error(e.to_string(), now);
    }
}
