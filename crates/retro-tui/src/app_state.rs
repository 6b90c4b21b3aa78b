//! AppState: shared read-only data passed to all components.
//!
//! Only the App event-loop writes to it.

use std::collections::HashSet;

use retro_core::model::{FavoriteSet, FilterState, Mirror, Station};
use retro_core::playback::PlaybackSession;

use crate::widgets::status_bar::InputMode;

/// Where the current station listing stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Listing {
    #[default]
    Loading,
    Ready,
    Failed,
}

pub struct AppState {
    // ── Directory ───────────────────────────────────────────────────────────
    pub stations: Vec<Station>,
    pub listing: Listing,
    pub mirror: Option<Mirror>,
    /// Stations that failed to play, hidden until the next listing arrives.
    pub hidden: HashSet<String>,

    // ── Filters / favorites ─────────────────────────────────────────────────
    pub filter: FilterState,
    pub favorites: FavoriteSet,

    // ── Playback ────────────────────────────────────────────────────────────
    pub session: PlaybackSession,

    // ── UI mode ─────────────────────────────────────────────────────────────
    pub input_mode: InputMode,
    pub show_keys_bar: bool,
}

impl AppState {
    pub fn new(filter: FilterState, favorites: FavoriteSet, session: PlaybackSession) -> Self {
        Self {
            stations: Vec::new(),
            listing: Listing::Loading,
            mirror: None,
            hidden: HashSet::new(),
            filter,
            favorites,
            session,
            input_mode: InputMode::Normal,
            show_keys_bar: true,
        }
    }

    pub fn station(&self, uuid: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.uuid == uuid)
    }

    pub fn visible_count(&self) -> usize {
        self.stations
            .iter()
            .filter(|s| !self.hidden.contains(&s.uuid))
            .count()
    }

    /// Replaces the listing; anything hidden by the previous one comes back.
    pub fn set_stations(&mut self, stations: Vec<Station>) {
        self.stations = stations;
        self.hidden.clear();
        self.listing = Listing::Ready;
    }

    /// Text shown in place of the list, if the list has nothing to show.
    pub fn list_message(&self) -> Option<&'static str> {
        match self.listing {
            Listing::Loading => Some("searching…"),
            Listing::Failed => Some("Failed to fetch data."),
            Listing::Ready if self.visible_count() > 0 => None,
            Listing::Ready if self.filter.favorites_only => Some("No favorites yet."),
            Listing::Ready => Some("No stations found."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(uuid: &str) -> Station {
        serde_json::from_value(serde_json::json!({
            "stationuuid": uuid,
            "name": uuid,
            "url_resolved": format!("http://stream.example/{}", uuid)
        }))
        .unwrap()
    }

    fn state() -> AppState {
        AppState::new(
            FilterState::default(),
            FavoriteSet::default(),
            PlaybackSession::new(100),
        )
    }

    #[test]
    fn test_list_messages() {
        let mut state = state();
        assert_eq!(state.list_message(), Some("searching…"));

        state.set_stations(Vec::new());
        assert_eq!(state.list_message(), Some("No stations found."));

        state.filter.toggle_favorites_only();
        assert_eq!(state.list_message(), Some("No favorites yet."));

        state.listing = Listing::Failed;
        assert_eq!(state.list_message(), Some("Failed to fetch data."));

        state.set_stations(vec![station("a")]);
        assert_eq!(state.list_message(), None);
    }

    #[test]
    fn test_hidden_until_next_listing() {
        let mut state = state();
        state.set_stations(vec![station("a"), station("b")]);
        state.hidden.insert("a".into());
        assert_eq!(state.visible_count(), 1);
        assert!(state.hidden.contains("a"));

        state.hidden.insert("b".into());
        assert_eq!(state.list_message(), Some("No stations found."));

        state.set_stations(vec![station("a"), station("b")]);
        assert_eq!(state.visible_count(), 2);
        assert!(state.station("b").is_some());
    }
}
