use std::collections::HashMap;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::intent::{Intent, Player};
use super::keys::intent_for;
use super::startup::{apply_playback_defaults, initial_dir};
use crate::app::InputMode;
use crate::audio::fake::FakeDevice;
use crate::config::Settings;
use crate::events::PlayerEvent;
use crate::library::{Fetch, FetchError};
use crate::playback::{Direction, Status};

const WAIT: Duration = Duration::from_secs(2);

struct FakeFetcher {
    results: HashMap<String, PathBuf>,
}

impl Fetch for FakeFetcher {
    fn fetch(&self, url: &str) -> Result<PathBuf, FetchError> {
        self.results
            .get(url)
            .cloned()
            .ok_or(FetchError::Status(404))
    }
}

/// A player over a temp directory holding `names`, oldest first.
fn player_with(names: &[&str]) -> (Player<FakeDevice>, Receiver<PlayerEvent>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        File::create(dir.path().join(name)).unwrap();
        // Creation times need to differ for a stable order.
        std::thread::sleep(Duration::from_millis(20));
    }
    let fetcher = Arc::new(FakeFetcher {
        results: HashMap::from([(
            "https://example.com/remote.mp3".to_string(),
            PathBuf::from("/tmp/remote.mp3"),
        )]),
    });
    let (tx, rx) = mpsc::channel();
    let mut player = Player::new(FakeDevice::new(), fetcher, tx, Settings::default());
    apply_playback_defaults(&mut player, dir.path().to_path_buf());
    (player, rx, dir)
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn view_names(player: &Player<FakeDevice>) -> Vec<String> {
    player.library.view_tracks().map(|t| t.name.clone()).collect()
}

#[test]
fn startup_loads_newest_first() {
    let (player, _rx, dir) = player_with(&["old.mp3", "notes.txt", "new.ogg"]);
    assert_eq!(view_names(&player), vec!["new.ogg", "old.mp3"]);
    assert_eq!(player.app.current_dir, Some(dir.path().display().to_string()));
    assert_eq!(player.app.volume, 100);
}

#[test]
fn empty_directory_starts_with_a_notice() {
    let (player, _rx, _dir) = player_with(&[]);
    assert!(player.library.is_empty());
    let (text, error) = player.app.flash_at(Instant::now()).unwrap();
    assert!(error);
    assert_eq!(text, "no playable tracks found");
}

#[test]
fn play_pause_from_stopped_plays_the_selection() {
    let (mut player, _rx, _dir) = player_with(&["a.mp3", "b.mp3"]);
    let now = Instant::now();

    player.apply(Intent::CursorDown, now);
    player.apply(Intent::PlayPause, now);
    assert_eq!(player.controller.status(), Status::Playing);
    assert_eq!(player.controller.current_index(), 1);
    assert_eq!(player.app.status, Status::Playing);
    assert!(player.reporter.is_armed());

    player.apply(Intent::PlayPause, now);
    assert_eq!(player.app.status, Status::Paused);
    assert!(!player.reporter.is_armed());

    player.apply(Intent::PlayPause, now);
    assert_eq!(player.app.status, Status::Playing);
}

#[test]
fn play_on_empty_library_flashes() {
    let (mut player, _rx, _dir) = player_with(&[]);
    let now = Instant::now();
    assert!(!player.apply(Intent::PlaySelected, now));
    assert_eq!(player.controller.status(), Status::Stopped);
    assert!(player.app.flash_at(now).is_some());
}

#[test]
fn play_on_empty_search_names_the_term() {
    let (mut player, _rx, _dir) = player_with(&["intro.mp3", "verse.mp3"]);
    let now = Instant::now();

    player.apply(Intent::BeginInput(InputMode::Search), now);
    for c in "zzz".chars() {
        player.apply(Intent::InputChar(c), now);
    }
    player.apply(Intent::SubmitInput, now);
    assert_eq!(player.library.view_len(), 0);

    player.apply(Intent::PlaySelected, now);
    assert_eq!(player.controller.status(), Status::Stopped);
    assert_eq!(
        player.app.flash_at(now),
        Some(("no tracks match 'zzz'", true))
    );
}

#[test]
fn next_at_the_end_is_reported_not_fatal() {
    let (mut player, _rx, _dir) = player_with(&["a.mp3"]);
    let now = Instant::now();
    player.apply(Intent::PlaySelected, now);
    player.apply(Intent::Next, now);

    assert_eq!(player.controller.status(), Status::Playing);
    assert_eq!(
        player.app.flash_at(now),
        Some(("no track in that direction", true))
    );
}

#[test]
fn tick_records_progress_and_seek_shows_target() {
    let (mut player, _rx, _dir) = player_with(&["a.mp3"]);
    let now = Instant::now();
    player.apply(Intent::PlaySelected, now);

    player.controller.device_mut().position = Duration::from_secs(7);
    player.handle_event(PlayerEvent::Tick, now);
    assert_eq!(
        player.app.progress.map(|p| p.elapsed),
        Some(Duration::from_secs(7))
    );

    // Fake tracks are 60s long.
    player.apply(Intent::SeekTenth(5), now);
    player.handle_event(PlayerEvent::Tick, now);
    assert_eq!(
        player.app.progress.map(|p| p.elapsed),
        Some(Duration::from_secs(30))
    );

    player.apply(Intent::Scrub(Direction::Forward), now);
    player.handle_event(PlayerEvent::Tick, now);
    assert_eq!(
        player.app.progress.map(|p| p.elapsed),
        Some(Duration::from_secs(12))
    );
}

#[test]
fn track_end_event_stops_playback() {
    let (mut player, rx, _dir) = player_with(&["a.mp3", "b.mp3"]);
    let now = Instant::now();
    player.apply(Intent::PlaySelected, now);

    player.controller.device_mut().finish();
    let event = rx.recv_timeout(WAIT).unwrap();
    player.handle_event(event, now);

    assert_eq!(player.app.status, Status::Stopped);
    assert_eq!(player.controller.current_index(), 0);
}

#[test]
fn search_filters_live_and_escape_restores() {
    let (mut player, _rx, _dir) = player_with(&["intro.mp3", "verse.mp3", "outro.mp3"]);
    let now = Instant::now();

    player.apply(Intent::BeginInput(InputMode::Search), now);
    for c in "tro".chars() {
        player.apply(Intent::InputChar(c), now);
    }
    assert_eq!(view_names(&player), vec!["outro.mp3", "intro.mp3"]);

    player.apply(Intent::InputChar('z'), now);
    assert_eq!(player.library.view_len(), 0);
    assert_eq!(
        player.app.flash_at(now),
        Some(("no tracks match 'troz'", true))
    );

    player.apply(Intent::CancelInput, now);
    assert_eq!(player.app.mode, InputMode::Normal);
    assert_eq!(player.library.view_len(), 3);
    assert_eq!(player.library.query(), "");
}

#[test]
fn search_enter_keeps_the_filter() {
    let (mut player, _rx, _dir) = player_with(&["intro.mp3", "verse.mp3"]);
    let now = Instant::now();

    player.apply(Intent::BeginInput(InputMode::Search), now);
    player.apply(Intent::InputChar('v'), now);
    player.apply(Intent::SubmitInput, now);

    assert_eq!(player.app.mode, InputMode::Normal);
    assert_eq!(view_names(&player), vec!["verse.mp3"]);
}

#[test]
fn shuffle_resets_cursor_and_index() {
    let (mut player, _rx, _dir) = player_with(&["a.mp3", "b.mp3", "c.mp3"]);
    let now = Instant::now();
    player.apply(Intent::CursorBottom, now);
    player.apply(Intent::PlaySelected, now);

    player.apply(Intent::Shuffle, now);
    assert_eq!(player.app.selected, 0);
    assert_eq!(player.controller.current_index(), 0);

    let mut names = view_names(&player);
    names.sort();
    assert_eq!(names, vec!["a.mp3", "b.mp3", "c.mp3"]);
}

#[test]
fn volume_keys_step_and_mute() {
    let (mut player, _rx, _dir) = player_with(&["a.mp3"]);
    let now = Instant::now();
    player.apply(Intent::VolumeDown, now);
    assert_eq!(player.app.volume, 95);

    player.apply(Intent::ToggleMute, now);
    assert!(player.app.muted);
    player.apply(Intent::ToggleMute, now);
    assert_eq!(player.app.volume, 95);

    player.apply(Intent::ToggleRepeat, now);
    assert!(player.app.repeat_one);
}

#[test]
fn open_dir_replaces_library_and_stops() {
    let (mut player, _rx, _dir) = player_with(&["a.mp3"]);
    let other = tempfile::tempdir().unwrap();
    File::create(other.path().join("x.flac")).unwrap();
    File::create(other.path().join("y.wav")).unwrap();
    let now = Instant::now();
    player.apply(Intent::PlaySelected, now);

    player.apply(Intent::BeginInput(InputMode::OpenDir), now);
    for c in other.path().display().to_string().chars() {
        player.apply(Intent::InputChar(c), now);
    }
    player.apply(Intent::SubmitInput, now);

    assert_eq!(player.library.len(), 2);
    assert_eq!(player.controller.status(), Status::Stopped);
    assert_eq!(player.app.now_playing, None);
    assert_eq!(player.app.flash_at(now), Some(("loaded 2 tracks", false)));
}

#[test]
fn open_dir_failure_keeps_playing() {
    let (mut player, _rx, _dir) = player_with(&["a.mp3"]);
    let empty = tempfile::tempdir().unwrap();
    let now = Instant::now();
    player.apply(Intent::PlaySelected, now);

    player.open_dir(empty.path().to_path_buf(), now);
    assert_eq!(player.library.len(), 1);
    assert_eq!(player.controller.status(), Status::Playing);
}

#[test]
fn url_prompt_fetches_in_background() {
    let (mut player, rx, _dir) = player_with(&["a.mp3"]);
    let now = Instant::now();

    player.apply(Intent::BeginInput(InputMode::Url), now);
    for c in "https://example.com/remote.mp3".chars() {
        player.apply(Intent::InputChar(c), now);
    }
    player.apply(Intent::SubmitInput, now);
    // Typing into the URL prompt never filters.
    assert_eq!(player.library.view_len(), 1);

    let event = rx.recv_timeout(WAIT).unwrap();
    player.handle_event(event, now);
    assert_eq!(view_names(&player), vec!["a.mp3", "remote.mp3"]);
    assert_eq!(player.app.flash_at(now), Some(("added remote.mp3", false)));
}

#[test]
fn failed_fetch_leaves_library_alone() {
    let (mut player, _rx, _dir) = player_with(&["a.mp3"]);
    let now = Instant::now();
    player.handle_event(
        PlayerEvent::Fetched {
            url: "https://example.com/nope.mp3".into(),
            result: Err(FetchError::Status(404)),
        },
        now,
    );
    assert_eq!(player.library.len(), 1);
    assert_eq!(
        player.app.flash_at(now),
        Some(("download failed: server answered with status 404", true))
    );
}

#[test]
fn quit_intent_ends_the_loop() {
    let (mut player, _rx, _dir) = player_with(&["a.mp3"]);
    assert!(player.apply(Intent::Quit, Instant::now()));
    player.shutdown();
    assert_eq!(player.app.status, Status::Stopped);
}

#[test]
fn keys_map_to_intents() {
    let (mut player, _rx, _dir) = player_with(&[]);
    let app = &mut player.app;

    assert_eq!(intent_for(key('j'), app), Some(Intent::CursorDown));
    assert_eq!(intent_for(key('7'), app), Some(Intent::SeekTenth(7)));
    assert_eq!(intent_for(key('L'), app), Some(Intent::Scrub(Direction::Forward)));
    assert_eq!(intent_for(key('u'), app), Some(Intent::BeginInput(InputMode::Url)));

    assert_eq!(intent_for(key('g'), app), None);
    assert_eq!(intent_for(key('g'), app), Some(Intent::CursorTop));
    assert_eq!(intent_for(key('g'), app), None);
    assert_eq!(intent_for(key('j'), app), Some(Intent::CursorDown));
    assert_eq!(intent_for(key('g'), app), None);
}

#[test]
fn prompt_keys_edit_the_input() {
    let (mut player, _rx, _dir) = player_with(&[]);
    player.app.begin_input(InputMode::Search, "");
    let app = &mut player.app;

    assert_eq!(intent_for(key('q'), app), Some(Intent::InputChar('q')));
    assert_eq!(
        intent_for(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), app),
        Some(Intent::CancelInput)
    );
    assert_eq!(
        intent_for(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), app),
        Some(Intent::SubmitInput)
    );
}

#[test]
fn initial_dir_prefers_the_argument() {
    let mut settings = Settings::default();
    settings.library.default_dir = Some(PathBuf::from("/srv/music"));

    assert_eq!(initial_dir(Some("/tmp/x".into()), &settings), PathBuf::from("/tmp/x"));
    assert_eq!(initial_dir(None, &settings), PathBuf::from("/srv/music"));
}
