//! Action enum: all user-initiated intents and internal events.

/// Direction for cycling a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next,
    Prev,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Playback ─────────────────────────────────────────────────────────────
    Play(String), // station uuid
    Stop,
    TogglePause,
    VolumeStep(i16),
    Mute,

    // ── Filters ──────────────────────────────────────────────────────────────
    CycleCountry(Step),
    CycleGenre(Step),
    ToggleFavoritesOnly,
    OpenSearch,
    CloseSearch,
    SearchChanged(String),

    // ── Directory ────────────────────────────────────────────────────────────
    Refetch,
    ReselectMirror,

    // ── Favorites ────────────────────────────────────────────────────────────
    ToggleFavorite(String), // station uuid

    // ── UI ───────────────────────────────────────────────────────────────────
    ToggleKeys,
    CopyToClipboard(String),

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
    Noop,
}
