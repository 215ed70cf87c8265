//! Application model: what the terminal shows.
//!
//! `App` never drives playback. It mirrors controller notices and progress
//! samples, and holds the purely visual bits: the cursor, the input prompt
//! and the transient flash line.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::playback::{Notice, PlaybackState, Progress, Status};

/// What keystrokes currently mean.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Live filter; every edit re-runs the search.
    Search,
    /// Path prompt for loading another directory.
    OpenDir,
    /// URL prompt for adding a remote track.
    Url,
}

impl InputMode {
    pub fn prompt(self) -> &'static str {
        match self {
            InputMode::Normal => "",
            InputMode::Search => "/",
            InputMode::OpenDir => "open: ",
            InputMode::Url => "url: ",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NowPlaying {
    pub index: usize,
    pub name: String,
}

#[derive(Clone, Debug)]
struct Flash {
    text: String,
    error: bool,
    until: Instant,
}

/// The main application model.
pub struct App {
    pub selected: usize,
    pub status: Status,
    pub now_playing: Option<NowPlaying>,
    /// Path of the loaded track while a session is live.
    pub playing: Option<PathBuf>,
    /// Last progress sample. Kept (frozen) while paused or stopped.
    pub progress: Option<Progress>,
    pub volume: u8,
    pub muted: bool,
    pub repeat_one: bool,
    pub mode: InputMode,
    pub input: String,
    pub current_dir: Option<String>,
    flash: Option<Flash>,
    flash_ttl: Duration,
    pending_g: bool,
}

impl App {
    pub fn new(flash_ttl: Duration) -> Self {
        Self {
            selected: 0,
            status: Status::Stopped,
            now_playing: None,
            playing: None,
            progress: None,
            volume: 100,
            muted: false,
            repeat_one: false,
            mode: InputMode::Normal,
            input: String::new(),
            current_dir: None,
            flash: None,
            flash_ttl,
            pending_g: false,
        }
    }

    /// Reflect a controller notice. The cursor follows the playing track.
    pub fn apply_notice(&mut self, notice: &Notice) {
        match notice {
            Notice::TrackChanged { index, name } => {
                self.now_playing = Some(NowPlaying {
                    index: *index,
                    name: name.clone(),
                });
                self.selected = *index;
                self.progress = None;
            }
            Notice::StatusChanged(status) => self.status = *status,
        }
    }

    /// Copy the mixer flags out of a controller snapshot.
    pub fn sync(&mut self, state: &PlaybackState) {
        self.status = state.status;
        self.volume = state.volume;
        self.muted = state.muted;
        self.repeat_one = state.repeat_one;
        self.playing = state.session.as_ref().map(|s| s.track.clone());
    }

    pub fn record_progress(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    /// Forget the now-playing line, e.g. after the library was replaced.
    pub fn clear_now_playing(&mut self) {
        self.now_playing = None;
        self.progress = None;
    }

    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    pub fn flash_info(&mut self, text: impl Into<String>, now: Instant) {
        self.set_flash(text.into(), false, now);
    }

    pub fn flash_error(&mut self, text: impl Into<String>, now: Instant) {
        self.set_flash(text.into(), true, now);
    }

    fn set_flash(&mut self, text: String, error: bool, now: Instant) {
        self.flash = Some(Flash {
            text,
            error,
            until: now + self.flash_ttl,
        });
    }

    /// The flash message still visible at `now`, and whether it is an error.
    pub fn flash_at(&self, now: Instant) -> Option<(&str, bool)> {
        self.flash
            .as_ref()
            .filter(|f| now < f.until)
            .map(|f| (f.text.as_str(), f.error))
    }

    pub fn expire_flash(&mut self, now: Instant) {
        if self.flash.as_ref().is_some_and(|f| now >= f.until) {
            self.flash = None;
        }
    }

    /// Move the cursor down within a view of `len` tracks.
    pub fn next(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn top(&mut self) {
        self.selected = 0;
    }

    pub fn bottom(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Keep the cursor inside a view of `len` tracks.
    pub fn clamp_selection(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Register a `g` press; true when it completes a `gg` chord.
    pub fn press_g(&mut self) -> bool {
        let chord = self.pending_g;
        self.pending_g = !chord;
        chord
    }

    pub fn clear_pending_g(&mut self) {
        self.pending_g = false;
    }

    pub fn begin_input(&mut self, mode: InputMode, initial: &str) {
        self.mode = mode;
        self.input.clear();
        self.input.push_str(initial);
        self.pending_g = false;
    }

    pub fn push_input(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_input(&mut self) {
        self.input.pop();
    }

    /// Leave the prompt, returning what was typed.
    pub fn finish_input(&mut self) -> String {
        self.mode = InputMode::Normal;
        std::mem::take(&mut self.input)
    }
}
