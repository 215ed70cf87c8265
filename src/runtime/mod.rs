use std::env;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::audio::RodioDevice;
use crate::events::PlayerEvent;
use crate::library::HttpFetcher;

mod event_loop;
mod intent;
mod keys;
mod settings;
mod startup;

use intent::Player;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    if let Err(e) = startup::init_logging(&settings.logging) {
        eprintln!("reprise: cannot open log file, logging disabled: {e}");
    }

    let dir = startup::initial_dir(env::args().nth(1), &settings);
    info!(dir = %dir.display(), "starting");

    let (events_tx, events_rx) = mpsc::channel::<PlayerEvent>();
    let device = RodioDevice::open(Duration::from_millis(settings.audio.end_poll_ms))?;
    let fetcher = Arc::new(HttpFetcher::new(&settings.remote));

    let mut player = Player::new(device, fetcher, events_tx, settings);
    startup::apply_playback_defaults(&mut player, dir);
    player.start_ticker();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &mut player, &events_rx);

    player.shutdown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("bye");
    run_result
}

#[cfg(test)]
mod tests;
