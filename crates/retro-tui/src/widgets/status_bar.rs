//! Status bar: bottom line with input mode, active mirror and keybindings.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use retro_core::model::Mirror;

use crate::theme::{C_MODE_NORMAL, C_MODE_SEARCH, C_MUTED, C_SECONDARY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "RADIO",
            Self::Search => "SEARCH",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Search => C_MODE_SEARCH,
        }
    }

    fn keys(self) -> &'static str {
        match self {
            Self::Normal => {
                " ↑↓/jk select  Enter play  Space pause  ←→ vol  m mute  f fav  F favs only  c/C country  g/G genre  / search  M mirror  r reload  y copy  K keys  q quit"
            }
            Self::Search => " type to search  Enter keep  Esc clear+close",
        }
    }
}

/// Draw the keybindings footer (one row) with the mirror in use on the right.
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, mirror: Option<&Mirror>) {
    let mirror_text = match mirror {
        Some(m) => format!(" {} ", m.hostname()),
        None => " no mirror ".to_string(),
    };
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(mirror_text.chars().count() as u16),
        ])
        .split(area);

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default()
                .fg(mode.color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(mode.keys(), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), cols[0]);
    frame.render_widget(
        Paragraph::new(Span::styled(mirror_text, Style::default().fg(C_SECONDARY))),
        cols[1],
    );
}
