//! Single-line text input over tui-input, used for the station search.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_FILTER_BG, C_FILTER_FG, C_MUTED};

const PROMPT: &str = "⌕ ";

#[derive(Debug, PartialEq)]
pub enum FilterAction {
    Changed(String),
    Confirmed,
    Cancelled,
    None,
}

pub struct FilterInput {
    input: Input,
    active: bool,
    placeholder: String,
}

impl FilterInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            active: false,
            placeholder: placeholder.into(),
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Handle a key while active.
    ///
    /// Esc with text clears it and reports `Changed("")`; Esc on an empty
    /// input closes it. Enter closes it and keeps the text.
    pub fn handle_key(&mut self, key: KeyEvent) -> FilterAction {
        match key.code {
            KeyCode::Esc => {
                if !self.input.value().is_empty() {
                    self.input = Input::default();
                    FilterAction::Changed(String::new())
                } else {
                    self.deactivate();
                    FilterAction::Cancelled
                }
            }
            KeyCode::Enter => {
                self.deactivate();
                FilterAction::Confirmed
            }
            _ => match self.input.handle_event(&Event::Key(key)) {
                Some(change) if change.value => {
                    FilterAction::Changed(self.input.value().to_string())
                }
                _ => FilterAction::None,
            },
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let prompt_w = PROMPT.chars().count();
        let scroll = self
            .input
            .visual_scroll(area.width.saturating_sub(prompt_w as u16 + 1) as usize);
        let value = self.input.value();
        let display = if value.is_empty() && !self.active {
            Span::styled(
                format!("{}{}", PROMPT, self.placeholder),
                Style::default().fg(C_MUTED),
            )
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(
                format!("{}{}", PROMPT, visible),
                Style::default().fg(C_FILTER_FG),
            )
        };

        let paragraph =
            Paragraph::new(Line::from(vec![display])).style(Style::default().bg(C_FILTER_BG));
        frame.render_widget(paragraph, area);

        if self.active && area.width > 0 {
            let cursor_x =
                area.x + prompt_w as u16 + self.input.visual_cursor().saturating_sub(scroll) as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width - 1), area.y));
        }
    }
}

impl Default for FilterInput {
    fn default() -> Self {
        Self::new("search…")
    }
}
