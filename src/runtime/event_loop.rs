use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::audio::AudioDevice;
use crate::events::PlayerEvent;
use crate::ui;

use super::intent::Player;
use super::keys::intent_for;

/// Main terminal event loop: applies background events, draws, then handles
/// input. Returns `Ok(())` when shutdown is requested.
pub fn run<D: AudioDevice>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    player: &mut Player<D>,
    events: &mpsc::Receiver<PlayerEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let now = Instant::now();
        while let Ok(event) = events.try_recv() {
            player.handle_event(event, now);
        }
        player.app.expire_flash(now);

        terminal.draw(|f| {
            ui::draw(
                f,
                &player.app,
                &player.library,
                &player.settings().controls,
                now,
            )
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(intent) = intent_for(key, &mut player.app) {
                    if player.apply(intent, Instant::now()) {
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
