//! Header component: 2-row top bar.
//!
//! Row 1: playback state and station name.
//! Row 2: volume gauge and mute indicator.
//!
//! Not focusable.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use retro_core::playback::{PlaybackSession, PlaybackStatus};

use crate::{
    app_state::AppState,
    component::Component,
    theme::{C_ACCENT, C_CONNECTING, C_ERROR, C_MUTED, C_PAUSED, C_PLAYING, C_PRIMARY, C_SECONDARY},
};

const GAUGE_WIDTH: usize = 20;

pub struct Header;

impl Header {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Header {
    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        frame.render_widget(Clear, area);
        if area.height < 2 {
            frame.render_widget(Paragraph::new(now_playing_line(&state.session)), area);
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);
        frame.render_widget(Paragraph::new(now_playing_line(&state.session)), rows[0]);
        frame.render_widget(Paragraph::new(volume_line(&state.session)), rows[1]);
    }

    fn min_height(&self) -> u16 {
        2
    }
}

/// Label, icon and color for the now-playing row.
pub fn status_label(status: PlaybackStatus) -> (&'static str, &'static str, Color) {
    match status {
        PlaybackStatus::Playing => ("▶", "NOW PLAYING", C_PLAYING),
        PlaybackStatus::Paused => ("⏸", "PAUSED", C_PAUSED),
        PlaybackStatus::Connecting => ("⋯", "CONNECTING", C_CONNECTING),
        PlaybackStatus::Error => ("⚠", "FAILED TO PLAY", C_ERROR),
        PlaybackStatus::Idle => ("■", "STOPPED", C_MUTED),
    }
}

fn now_playing_line(session: &PlaybackSession) -> Line<'static> {
    let status = session.status();
    let Some(now) = session.now_playing() else {
        return match status {
            PlaybackStatus::Error => Line::from(vec![Span::styled(
                " ⚠ Failed to play. Pick another station.",
                Style::default().fg(C_ERROR),
            )]),
            _ => Line::from(vec![Span::styled(
                " ■ select a station and press Enter",
                Style::default().fg(C_MUTED),
            )]),
        };
    };

    let (icon, label, color) = status_label(status);
    Line::from(vec![
        Span::styled(
            format!(" {} {}: ", icon, label),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            now.name.clone(),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn volume_line(session: &PlaybackSession) -> Line<'static> {
    let (icon, color) = if session.is_muted() {
        ("🔇", C_MUTED)
    } else {
        ("🔊", C_ACCENT)
    };
    let volume = session.volume() as usize;
    let filled = (volume * GAUGE_WIDTH + 50) / 100;
    Line::from(vec![
        Span::styled(format!(" {} ", icon), Style::default().fg(color)),
        Span::styled("█".repeat(filled), Style::default().fg(color)),
        Span::styled(
            "░".repeat(GAUGE_WIDTH - filled),
            Style::default().fg(C_MUTED),
        ),
        Span::styled(format!(" {:>3}%", volume), Style::default().fg(C_SECONDARY)),
    ])
}
