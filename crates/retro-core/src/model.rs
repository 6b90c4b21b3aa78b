use serde::{Deserialize, Serialize};
use std::fmt;

/// Hostname of one radio-browser API instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mirror(String);

impl Mirror {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self(hostname.into())
    }

    pub fn hostname(&self) -> &str {
        &self.0
    }

    /// `{scheme}://{hostname}` with no trailing slash.
    pub fn base_url(&self, scheme: &str) -> String {
        format!("{}://{}", scheme, self.0)
    }
}

impl fmt::Display for Mirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the mirror discovery response.
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorRecord {
    #[serde(default)]
    pub name: String,
}

/// A station record as returned by the search and by-uuid endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "stationuuid")]
    pub uuid: String,
    pub name: String,
    /// Comma-joined tag list, exactly as the API sends it.
    #[serde(default)]
    pub tags: String,
    #[serde(rename = "url_resolved", default)]
    pub stream_url: String,
    #[serde(rename = "countrycode", default)]
    pub country_code: String,
    #[serde(default)]
    pub codec: String,
    #[serde(default)]
    pub bitrate: u32,
}

impl Station {
    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        self.tags.split(',').map(str::trim).filter(|t| !t.is_empty())
    }

    /// First `n` tags joined with ", ".
    pub fn display_tags(&self, n: usize) -> String {
        self.tag_list().take(n).collect::<Vec<_>>().join(", ")
    }

    /// Short stream descriptor such as "MP3 128k · GB". Missing parts are left out.
    pub fn stream_info(&self) -> String {
        let mut parts = Vec::new();
        let format = match (self.codec.trim(), self.bitrate) {
            ("", 0) => String::new(),
            ("", kbps) => format!("{}k", kbps),
            (codec, 0) => codec.to_uppercase(),
            (codec, kbps) => format!("{} {}k", codec.to_uppercase(), kbps),
        };
        if !format.is_empty() {
            parts.push(format);
        }
        if !self.country_code.is_empty() {
            parts.push(self.country_code.clone());
        }
        parts.join(" · ")
    }
}

/// Active search criteria. Empty strings mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub country: String,
    pub genre_tag: String,
    pub search_term: String,
    pub favorites_only: bool,
}

impl FilterState {
    pub fn with_country(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            ..Self::default()
        }
    }

    pub fn set_country(&mut self, country: impl Into<String>) {
        self.country = country.into();
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Picking a genre leaves favorites-only mode.
    pub fn select_genre(&mut self, tag: impl Into<String>) {
        self.genre_tag = tag.into();
        self.favorites_only = false;
    }

    /// Flips favorites-only mode. The genre tag is kept and still applies to
    /// country searches.
    pub fn toggle_favorites_only(&mut self) -> bool {
        self.favorites_only = !self.favorites_only;
        self.favorites_only
    }

    pub fn all_countries(&self) -> bool {
        self.country.is_empty()
    }

    /// Favorites-only with no country: stations are looked up one by one
    /// instead of searched.
    pub fn lists_favorites_by_id(&self) -> bool {
        self.favorites_only && self.all_countries()
    }
}

/// Starred station identifiers in the order they were starred.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FavoriteSet(Vec<String>);

impl FavoriteSet {
    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|f| f == id)
    }

    /// Adds `id` if absent, removes it otherwise. Returns the new membership.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(pos) = self.0.iter().position(|f| f == id) {
            self.0.remove(pos);
            false
        } else {
            self.0.push(id.to_string());
            true
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for FavoriteSet {
    fn from(ids: Vec<String>) -> Self {
        let mut set = FavoriteSet::default();
        for id in ids {
            if !set.contains(&id) {
                set.0.push(id);
            }
        }
        set
    }
}

impl From<FavoriteSet> for Vec<String> {
    fn from(set: FavoriteSet) -> Self {
        set.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favorite_set_drops_duplicates_on_load() {
        let set: FavoriteSet = serde_json::from_str(r#"["b", "a", "b"]"#).unwrap();
        assert_eq!(set.ids(), ["b".to_string(), "a".to_string()]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["b","a"]"#);
    }

    #[test]
    fn test_favorite_toggle_twice_restores() {
        let mut set = FavoriteSet::from(vec!["a".to_string()]);
        assert!(set.toggle("b"));
        assert!(set.contains("b"));
        assert!(!set.toggle("b"));
        assert_eq!(set, FavoriteSet::from(vec!["a".to_string()]));
    }

    #[test]
    fn test_station_from_api_record() {
        let json = r#"{
            "changeuuid": "c-1",
            "stationuuid": "9617a958-0601-11e8-ae97-52543be04c81",
            "name": "Jazz FM",
            "url": "http://example.com/jazz.pls",
            "url_resolved": "http://example.com/jazz.mp3",
            "tags": "jazz, smooth jazz,,soul",
            "countrycode": "GB",
            "codec": "MP3",
            "bitrate": 128,
            "votes": 4021
        }"#;
        let station: Station = serde_json::from_str(json).unwrap();
        assert_eq!(station.uuid, "9617a958-0601-11e8-ae97-52543be04c81");
        assert_eq!(station.stream_url, "http://example.com/jazz.mp3");
        assert_eq!(station.display_tags(2), "jazz, smooth jazz");
        assert_eq!(station.tag_list().count(), 3);
        assert_eq!(station.stream_info(), "MP3 128k · GB");
    }

    #[test]
    fn test_station_minimal_record() {
        let station: Station =
            serde_json::from_str(r#"{"stationuuid": "u", "name": "n"}"#).unwrap();
        assert_eq!(station.tags, "");
        assert_eq!(station.display_tags(2), "");
        assert_eq!(station.stream_info(), "");
    }

    #[test]
    fn test_stream_info_skips_missing_parts() {
        let station: Station = serde_json::from_str(
            r#"{"stationuuid": "u", "name": "n", "codec": "aac+", "countrycode": ""}"#,
        )
        .unwrap();
        assert_eq!(station.stream_info(), "AAC+");

        let station: Station = serde_json::from_str(
            r#"{"stationuuid": "u", "name": "n", "bitrate": 64, "countrycode": "FR"}"#,
        )
        .unwrap();
        assert_eq!(station.stream_info(), "64k · FR");
    }

    #[test]
    fn test_genre_selection_leaves_favorites_mode() {
        let mut filter = FilterState::default();
        assert!(filter.toggle_favorites_only());
        assert!(filter.lists_favorites_by_id());

        filter.select_genre("jazz");
        assert!(!filter.favorites_only);
        assert_eq!(filter.genre_tag, "jazz");

        filter.toggle_favorites_only();
        assert_eq!(filter.genre_tag, "jazz");
        filter.set_country("US");
        assert!(!filter.lists_favorites_by_id());
    }

    #[test]
    fn test_mirror_base_url() {
        let mirror = Mirror::new("de1.api.radio-browser.info");
        assert_eq!(
            mirror.base_url("https"),
            "https://de1.api.radio-browser.info"
        );
        assert_eq!(mirror.to_string(), "de1.api.radio-browser.info");
    }
}
