//! StationList component: the main pane listing the current search results.

use std::collections::HashSet;
use std::time::Instant;

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use retro_core::model::Station;

use crate::{
    action::Action,
    app_state::{AppState, Listing},
    component::Component,
    components::header::status_label,
    theme::{
        C_ACCENT, C_ERROR, C_MUTED, C_PRIMARY, C_SECONDARY, C_SELECTION_BG, C_STAR, C_STAR_OFF,
        C_TAG,
    },
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
    },
};

const DOUBLE_CLICK_MS: u128 = 400;

pub struct StationList {
    pub list: ScrollableList<Station>,
    list_state: ListState,
    /// Last click (row index, time) for double-click detection.
    last_click: Option<(usize, Instant)>,
}

impl StationList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(),
            list_state: ListState::default(),
            last_click: None,
        }
    }

    /// Takes a fresh listing from the app state. The cursor returns to the top.
    pub fn sync_stations(&mut self, state: &AppState) {
        self.list.set_items(state.stations.clone());
        self.sync_hidden(state);
    }

    /// Re-applies the set of stations that failed to play.
    pub fn sync_hidden(&mut self, state: &AppState) {
        let hidden: HashSet<String> = state.hidden.clone();
        self.list.set_hidden(move |s: &Station| hidden.contains(&s.uuid));
    }

    /// Enter on the station already loaded stops it; anything else plays.
    fn activate_selected(&self, state: &AppState) -> Vec<Action> {
        let Some(station) = self.list.selected_item() else {
            return vec![];
        };
        let active = state.session.is_playing(&station.uuid) && state.session.status().is_active();
        if active {
            vec![Action::Stop]
        } else {
            vec![Action::Play(station.uuid.clone())]
        }
    }

    fn render_item(
        &self,
        station: &Station,
        is_selected: bool,
        state: &AppState,
    ) -> ListItem<'static> {
        let is_current = state.session.is_playing(&station.uuid);
        let status = state.session.status();

        let (icon, icon_color): (&'static str, Color) = if is_current {
            let (icon, _, color) = status_label(status);
            (icon, color)
        } else {
            (" ", C_MUTED)
        };

        let name_style = if is_current {
            let (_, _, color) = status_label(status);
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else if is_selected {
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_SECONDARY)
        };

        let star = if state.favorites.contains(&station.uuid) {
            Span::styled("★ ", Style::default().fg(C_STAR))
        } else {
            Span::styled("☆ ", Style::default().fg(C_STAR_OFF))
        };

        let mut spans = vec![
            Span::raw(" "),
            star,
            Span::styled(icon, Style::default().fg(icon_color)),
            Span::raw(" "),
            Span::styled(station.name.clone(), name_style),
        ];

        let tags = station.display_tags(2);
        if !tags.is_empty() {
            spans.push(Span::styled("  ", Style::default()));
            spans.push(Span::styled(tags, Style::default().fg(C_TAG)));
        }

        let info = station.stream_info();
        if !info.is_empty() {
            spans.push(Span::styled(format!("  {}", info), Style::default().fg(C_MUTED)));
        }

        let item_bg = if is_selected {
            Style::default().bg(C_SELECTION_BG)
        } else {
            Style::default()
        };
        ListItem::new(Line::from(spans)).style(item_bg)
    }
}

impl Default for StationList {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for StationList {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }

        let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
            5
        } else {
            1
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(step),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(step),
            KeyCode::PageUp => self.list.select_up(10),
            KeyCode::PageDown => self.list.select_down(10),
            KeyCode::Home => self.list.select_first(),
            KeyCode::End => self.list.select_last(),

            KeyCode::Enter => return self.activate_selected(state),

            KeyCode::Char('f') | KeyCode::Char('*') => {
                if let Some(st) = self.list.selected_item() {
                    return vec![Action::ToggleFavorite(st.uuid.clone())];
                }
            }

            KeyCode::Char('y') => {
                if let Some(st) = self.list.selected_item() {
                    return vec![Action::CopyToClipboard(st.stream_url.clone())];
                }
            }

            KeyCode::Char('/') => return vec![Action::OpenSearch],

            _ => {}
        }

        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, state: &AppState) -> Vec<Action> {
        let rel_row = event.row.saturating_sub(area.y + 1) as usize; // +1 for border
        match event.kind {
            MouseEventKind::ScrollUp => self.list.select_up(1),
            MouseEventKind::ScrollDown => self.list.select_down(1),
            MouseEventKind::Down(MouseButton::Left) => {
                let now = Instant::now();
                let is_double = self
                    .last_click
                    .map(|(row, t)| row == rel_row && t.elapsed().as_millis() < DOUBLE_CLICK_MS)
                    .unwrap_or(false);

                if self.list.handle_click(rel_row) && is_double {
                    self.last_click = None;
                    return self.activate_selected(state);
                }
                self.last_click = Some((rel_row, now));
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = if state.filter.favorites_only {
            Some(Badge {
                text: "★ favorites".to_string(),
                color: C_STAR,
            })
        } else if state.listing == Listing::Ready {
            Some(Badge {
                text: state.visible_count().to_string(),
                color: C_ACCENT,
            })
        } else {
            None
        };
        let block = pane_chrome("stations", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(msg) = state.list_message() {
            let color = if state.listing == Listing::Failed {
                C_ERROR
            } else {
                C_MUTED
            };
            frame.render_widget(
                Paragraph::new(Span::styled(format!("  {}", msg), Style::default().fg(color))),
                inner,
            );
            return;
        }

        let content_h = inner.height as usize;
        self.list.ensure_visible(content_h);
        let sel_in_view = self.list.selected_in_view(content_h);

        let items: Vec<ListItem> = self
            .list
            .visible_items(content_h)
            .into_iter()
            .enumerate()
            .map(|(view_row, (_, station))| {
                self.render_item(station, view_row == sel_in_view, state)
            })
            .collect();

        let list = List::new(items)
            .highlight_style(Style::default())
            .highlight_symbol("");

        self.list_state.select(Some(sel_in_view));
        frame.render_stateful_widget(list, inner, &mut self.list_state);
    }

    fn min_height(&self) -> u16 {
        5
    }
}
