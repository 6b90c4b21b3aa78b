//! Color palette and style constants for the retro-radio TUI.

use ratatui::style::{Color, Style};

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_BG: Color = Color::Rgb(16, 14, 12);
pub const C_ACCENT: Color = Color::Rgb(255, 140, 0); // #ff8c00
pub const C_PLAYING: Color = Color::Rgb(255, 140, 0);
pub const C_CONNECTING: Color = Color::Rgb(255, 196, 92);
pub const C_PAUSED: Color = Color::Rgb(196, 150, 90);
pub const C_ERROR: Color = Color::Rgb(255, 107, 107); // #ff6b6b
pub const C_MUTED: Color = Color::Rgb(84, 76, 68);
pub const C_SEPARATOR: Color = Color::Rgb(48, 42, 36);
pub const C_SECONDARY: Color = Color::Rgb(150, 138, 122);
pub const C_PRIMARY: Color = Color::Rgb(232, 222, 205);
pub const C_SELECTION_BG: Color = Color::Rgb(40, 32, 24);
pub const C_PANEL_BORDER: Color = Color::Rgb(58, 50, 42);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(255, 140, 0);
pub const C_FILTER_BG: Color = Color::Rgb(26, 22, 18);
pub const C_FILTER_FG: Color = Color::Rgb(255, 200, 80);
pub const C_TAG: Color = Color::Rgb(170, 150, 110);
pub const C_STAR: Color = Color::Rgb(255, 210, 50);
pub const C_STAR_OFF: Color = Color::Rgb(70, 62, 54);
pub const C_WAVE: Color = Color::Rgb(255, 140, 0);
pub const C_WAVE_IDLE: Color = Color::Rgb(120, 80, 30);
pub const C_TOAST_INFO: Color = Color::Rgb(120, 170, 220);
pub const C_TOAST_SUCCESS: Color = Color::Rgb(140, 200, 110);
pub const C_TOAST_WARNING: Color = Color::Rgb(255, 184, 80);
pub const C_TOAST_ERROR: Color = Color::Rgb(255, 107, 107);
pub const C_MODE_NORMAL: Color = Color::Rgb(150, 138, 122);
pub const C_MODE_SEARCH: Color = Color::Rgb(255, 200, 80);

// ── Predefined styles ─────────────────────────────────────────────────────────

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}
