//! Toast notifications: transient status messages in the top-right corner.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::theme::{C_TOAST_ERROR, C_TOAST_INFO, C_TOAST_SUCCESS, C_TOAST_WARNING};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn icon(self) -> &'static str {
        match self {
            Self::Info => "·",
            Self::Success => "✓",
            Self::Warning => "⚠",
            Self::Error => "✗",
        }
    }
}

struct Toast {
    message: String,
    severity: Severity,
    expires: Instant,
}

/// A spinner that animates until it is dismissed.
struct SpinnerToast {
    message: String,
    frame: usize,
}

const SPINNER_FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

pub struct ToastManager {
    toasts: VecDeque<Toast>,
    spinner: Option<SpinnerToast>,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            spinner: None,
            max_visible: 3,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity, duration: Duration) {
        let msg = message.into();
        self.toasts.retain(|t| t.message != msg);
        self.toasts.push_back(Toast {
            message: msg,
            severity,
            expires: Instant::now() + duration,
        });
        while self.toasts.len() > self.max_visible * 2 {
            self.toasts.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Info, Duration::from_secs(3));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Success, Duration::from_secs(3));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Warning, Duration::from_secs(4));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Error, Duration::from_secs(5));
    }

    /// Start or replace the spinner. It stays up until `dismiss_spinner`.
    pub fn spinner(&mut self, message: impl Into<String>) {
        self.spinner = Some(SpinnerToast {
            message: message.into(),
            frame: 0,
        });
    }

    pub fn dismiss_spinner(&mut self) {
        self.spinner = None;
    }

    /// Drop expired toasts and advance the spinner. Call each tick.
    pub fn tick(&mut self) {
        self.expire(Instant::now());
        if let Some(ref mut s) = self.spinner {
            s.frame = (s.frame + 1) % SPINNER_FRAMES.len();
        }
    }

    fn expire(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires > now);
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty() && self.spinner.is_none()
    }

    /// Messages currently queued, oldest first.
    #[cfg(test)]
    pub fn messages(&self) -> impl Iterator<Item = (&str, Severity)> {
        self.toasts.iter().map(|t| (t.message.as_str(), t.severity))
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        if self.is_empty() {
            return;
        }
        let max_width = (area.width / 2).clamp(30, 60);
        let mut y = area.y + 1;

        let mut rows: Vec<(String, Style)> = Vec::new();
        if let Some(ref s) = self.spinner {
            let icon = SPINNER_FRAMES[s.frame % SPINNER_FRAMES.len()];
            rows.push((
                format!(" {} {} ", icon, s.message),
                Style::default().fg(C_TOAST_INFO).add_modifier(Modifier::BOLD),
            ));
        }
        for toast in self.toasts.iter().rev().take(self.max_visible) {
            let color = match toast.severity {
                Severity::Info => C_TOAST_INFO,
                Severity::Success => C_TOAST_SUCCESS,
                Severity::Warning => C_TOAST_WARNING,
                Severity::Error => C_TOAST_ERROR,
            };
            rows.push((
                format!(" {} {} ", toast.severity.icon(), toast.message),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
        }

        for (text, style) in rows {
            if y >= area.y + area.height {
                break;
            }
            let w = (unicode_width::UnicodeWidthStr::width(text.as_str()) as u16).min(max_width);
            let x = area.x + area.width.saturating_sub(w + 1);
            let toast_area = Rect {
                x,
                y,
                width: w,
                height: 1,
            };
            frame.render_widget(Clear, toast_area);
            frame.render_widget(
                Paragraph::new(Line::from(vec![Span::styled(text, style)])),
                toast_area,
            );
            y += 1;
        }
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message_replaces_older() {
        let mut toasts = ToastManager::new();
        toasts.warning("Failed to play");
        toasts.info("copied");
        toasts.warning("Failed to play");

        let queued: Vec<&str> = toasts.messages().map(|(m, _)| m).collect();
        assert_eq!(queued, ["copied", "Failed to play"]);
    }

    #[test]
    fn test_expired_toasts_are_dropped() {
        let mut toasts = ToastManager::new();
        toasts.push("short", Severity::Info, Duration::from_millis(10));
        toasts.push("long", Severity::Error, Duration::from_secs(60));

        toasts.expire(Instant::now() + Duration::from_secs(1));
        let queued: Vec<(&str, Severity)> = toasts.messages().collect();
        assert_eq!(queued, [("long", Severity::Error)]);
    }

    #[test]
    fn test_spinner_keeps_manager_busy() {
        let mut toasts = ToastManager::new();
        assert!(toasts.is_empty());
        toasts.spinner("switching mirror…");
        toasts.tick();
        assert!(!toasts.is_empty());
        toasts.dismiss_spinner();
        assert!(toasts.is_empty());
    }
}
