use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;
use std::{env, io};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::audio::AudioDevice;
use crate::config::{self, LoggingSettings};

use super::intent::Player;

/// Send `tracing` output to the configured log file.
///
/// The terminal belongs to the UI, so without a file nothing is logged.
/// `RUST_LOG` overrides the configured filter.
pub fn init_logging(settings: &LoggingSettings) -> io::Result<bool> {
    let Some(path) = &settings.file else {
        return Ok(false);
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.filter));

    // A second init (tests, embedding) keeps the first subscriber.
    let installed = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(filter)
        .try_init()
        .is_ok();
    Ok(installed)
}

/// Directory to open: the first CLI argument, then `library.default_dir`,
/// then the working directory.
pub fn initial_dir(arg: Option<String>, settings: &config::Settings) -> PathBuf {
    arg.map(PathBuf::from)
        .or_else(|| settings.library.default_dir.clone())
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Apply the configured playback defaults and load the first directory.
///
/// A directory without tracks is not fatal: the player starts empty and
/// shows why.
pub fn apply_playback_defaults<D: AudioDevice>(player: &mut Player<D>, dir: PathBuf) {
    let settings = player.settings().clone();
    let now = Instant::now();

    player.controller.set_volume(i32::from(settings.audio.initial_volume));
    if settings.playback.repeat_one {
        player.controller.toggle_repeat();
    }

    player.open_dir(dir, now);
    if settings.playback.shuffle && !player.library.is_empty() {
        player.shuffle(now);
    }
    player.flush();

    match player.library.len() {
        0 => warn!("starting with an empty library"),
        n => info!(tracks = n, "library ready"),
    }
}
