//! FilterBar component: country and genre selectors, favorites-only flag and
//! the search input.

use ratatui::crossterm::event::{KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{Action, Step},
    app_state::AppState,
    component::Component,
    theme::{C_ACCENT, C_MUTED, C_SECONDARY, C_SEPARATOR, C_STAR},
    widgets::filter_input::{FilterAction, FilterInput},
};

pub struct FilterBar {
    pub input: FilterInput,
}

impl FilterBar {
    pub fn new() -> Self {
        Self {
            input: FilterInput::new("press / to search station names"),
        }
    }

    fn selectors_line(state: &AppState) -> Line<'static> {
        let filter = &state.filter;
        let country = if filter.country.is_empty() {
            "All countries".to_string()
        } else {
            filter.country.clone()
        };
        let genre = if filter.genre_tag.is_empty() {
            "All genres".to_string()
        } else {
            filter.genre_tag.clone()
        };
        let value = Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD);
        let label = Style::default().fg(C_SECONDARY);
        let sep = Span::styled("  │  ", Style::default().fg(C_SEPARATOR));

        let mut spans = vec![
            Span::styled(" country ", label),
            Span::styled(country, value),
            sep.clone(),
            Span::styled("genre ", label),
            Span::styled(genre, value),
            sep,
        ];
        if filter.favorites_only {
            spans.push(Span::styled(
                "★ favorites only",
                Style::default().fg(C_STAR).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled("☆ all stations", Style::default().fg(C_MUTED)));
        }
        Line::from(spans)
    }
}

impl Default for FilterBar {
    fn default() -> Self {
        Self::new()
    }
}

/// The option after (or before) `current` in `options`, wrapping around.
/// A value not in the list starts from the first option.
pub fn cycle(options: &[String], current: &str, step: Step) -> String {
    if options.is_empty() {
        return String::new();
    }
    let len = options.len();
    let next = match options.iter().position(|o| o == current) {
        Some(i) => match step {
            Step::Next => (i + 1) % len,
            Step::Prev => (i + len - 1) % len,
        },
        None => 0,
    };
    options[next].clone()
}

impl Component for FilterBar {
    /// Only receives keys while the search input is open.
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match self.input.handle_key(key) {
            FilterAction::Changed(q) => vec![Action::SearchChanged(q)],
            FilterAction::Confirmed | FilterAction::Cancelled => vec![Action::CloseSearch],
            FilterAction::None => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        match action {
            Action::OpenSearch => self.input.activate(),
            Action::CloseSearch => self.input.deactivate(),
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        if area.height < 2 {
            frame.render_widget(Paragraph::new(Self::selectors_line(state)), area);
            return;
        }
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);
        frame.render_widget(Paragraph::new(Self::selectors_line(state)), rows[0]);
        self.input.draw(frame, rows[1]);
    }

    fn min_height(&self) -> u16 {
        2
    }
}
