//! Waveform: decorative bars that jitter while a stream plays.

use rand::Rng;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use retro_core::playback::PlaybackStatus;

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    theme::{C_WAVE, C_WAVE_IDLE},
};

pub const BAR_COUNT: usize = 18;

/// Bar heights for an area `height` units tall.
///
/// Playing: each bar is `rand * h * 0.4 + h * 0.1`. Otherwise every bar is a
/// flat `h * 0.15`.
pub fn bar_heights<R: Rng>(playing: bool, height: f64, rng: &mut R) -> Vec<f64> {
    (0..BAR_COUNT)
        .map(|_| {
            if playing {
                rng.gen::<f64>() * height * 0.4 + height * 0.1
            } else {
                height * 0.15
            }
        })
        .collect()
}

pub struct Waveform {
    bars: Vec<f64>,
    animating: bool,
}

impl Waveform {
    pub fn new() -> Self {
        Self {
            bars: Vec::new(),
            animating: false,
        }
    }

    fn reroll(&mut self, playing: bool) {
        self.bars = bar_heights(playing, 1.0, &mut rand::thread_rng());
        self.animating = playing;
    }
}

impl Default for Waveform {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Waveform {
    fn tick(&mut self, state: &AppState) -> Vec<Action> {
        let playing = state.session.status() == PlaybackStatus::Playing;
        // Static bars only need computing once
        if playing || self.animating || self.bars.is_empty() {
            self.reroll(playing);
        }
        Vec::new()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, _state: &AppState) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        if self.bars.is_empty() {
            self.reroll(false);
        }
        let color = if self.animating { C_WAVE } else { C_WAVE_IDLE };
        let rows = area.height as usize;
        let slot = (area.width as usize / BAR_COUNT).max(1);
        let center = (rows as f64 - 1.0) / 2.0;

        // Bar heights are fractions of the area; a bar spans rows around the centre
        let lines: Vec<Line> = (0..rows)
            .map(|row| {
                let spans: Vec<Span> = self
                    .bars
                    .iter()
                    .map(|frac| {
                        let half = (frac * rows as f64 / 2.0).max(0.5);
                        let lit = (row as f64 - center).abs() <= half;
                        let glyph = if lit { "┃" } else { " " };
                        Span::styled(
                            format!("{:^width$}", glyph, width = slot),
                            Style::default().fg(color),
                        )
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
    }
}
