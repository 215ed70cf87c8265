//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style, Stylize},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, InputMode};
use crate::config::ControlsSettings;
use crate::library::{Library, Track};
use crate::playback::Status;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("enter", "play selected");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next");
    // H/L and +/- are filled in from config.
    map.insert("0-9", "jump to tenth");
    map.insert("m", "mute");
    map.insert("r", "repeat one");
    map.insert("s", "shuffle");
    map.insert("/", "search");
    map.insert("o", "open dir");
    map.insert("u", "add url");
    map.insert("x", "stop");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating the configured steps.
fn controls_text(controls: &ControlsSettings) -> String {
    let order = [
        "j/k", "h/l", "H/L", "0-9", "enter", "space/p", "x", "+/-", "m", "r", "s", "gg/G", "/",
        "o", "u", "q",
    ];
    order
        .iter()
        .filter_map(|k| match *k {
            "H/L" => Some(format!("[H/L] scrub -/+{}s", controls.scrub_seconds)),
            "+/-" => Some(format!("[+/-] volume {}", controls.volume_step)),
            _ => CONTROLS_MAP.get(k).map(|v| format!("[{k}] {v}")),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
pub(crate) fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn status_text(app: &App, library: &Library) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(match app.status {
        Status::Playing => " PLAYING".to_string(),
        Status::Paused => " PAUSED".to_string(),
        Status::Stopped => " STOPPED".to_string(),
    });

    if let Some(now) = &app.now_playing {
        parts.push(format!("Song: {}", now.name));
    }

    if app.muted {
        parts.push("Volume: muted".to_string());
    } else {
        parts.push(format!("Volume: {}%", app.volume));
    }

    parts.push(if app.repeat_one {
        "Repeat: one".to_string()
    } else {
        "Repeat: off".to_string()
    });

    let query = library.query();
    if !query.is_empty() {
        parts.push(format!(
            "Search: {query} ({}/{})",
            library.view_len(),
            library.len()
        ));
    }

    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {dir}"));
    }

    parts.join(" • ")
}

/// Gauge label: `elapsed / total`, or dashes before the first sample.
fn progress_label(app: &App) -> String {
    match app.progress {
        Some(p) => format!("{} / {}", format_mmss(p.elapsed), format_mmss(p.total)),
        None => "--:-- / --:--".to_string(),
    }
}

/// Rows are matched by path; two files can share a basename.
fn is_now_playing(app: &App, track: &Track) -> bool {
    app.status != Status::Stopped && app.playing.as_deref() == Some(track.path.as_path())
}

/// Visible window `[start, end)` over `total` rows that keeps `selected`
/// centred when possible.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize) {
    if total <= height || height == 0 {
        return (0, total);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    library: &Library,
    controls: &ControlsSettings,
    now: Instant,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new("a small local playlist player")
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" reprise ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status = Paragraph::new(status_text(app, library))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    let gauge = Gauge::default()
        .block(Block::bordered().title(" progress "))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(app.progress.map(|p| p.ratio()).unwrap_or(0.0))
        .label(progress_label(app));
    frame.render_widget(gauge, chunks[2]);

    // Main list
    {
        let total = library.view_len();
        let list_height = chunks[3].height.saturating_sub(2) as usize;
        let selected = app.selected.min(total.saturating_sub(1));
        let (start, end) = visible_window(total, list_height, selected);
        // Only build items for the visible window.
        let items: Vec<ListItem> = library
            .view_tracks()
            .skip(start)
            .take(end - start)
            .map(|track| {
                let item = ListItem::new(track.name.as_str());
                if is_now_playing(app, track) {
                    item.bold()
                } else {
                    item
                }
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected - start));
        }
        frame.render_stateful_widget(list, chunks[3], &mut state);
    }

    // Prompt while typing, otherwise the latest notice.
    let line = if app.mode != InputMode::Normal {
        Paragraph::new(format!(" {}{}_", app.mode.prompt(), app.input))
    } else if let Some((text, error)) = app.flash_at(now) {
        let p = Paragraph::new(format!(" {text}"));
        if error { p.red() } else { p.green() }
    } else {
        Paragraph::new("")
    };
    frame.render_widget(line, chunks[4]);

    let footer = Paragraph::new(controls_text(controls))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);
}
