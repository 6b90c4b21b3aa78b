//! App: component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - Commands to the player actor flow out through `PlayerHandle`.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use retro_core::config::Config;
use retro_core::directory::{Directory, FetchError};
use retro_core::model::{FilterState, Mirror, Station};
use retro_core::playback::PlaybackSession;
use retro_core::prefs::Preferences;
use retro_core::search::{RequestGate, SearchDebouncer, Ticket};
use retro_core::transport::HttpTransport;

use crate::{
    action::{Action, Step},
    app_state::{AppState, Listing},
    component::Component,
    components::{
        filter_bar::{cycle, FilterBar},
        header::Header,
        station_list::StationList,
        waveform::Waveform,
    },
    player::{spawn_player, PlayerCommand, PlayerHandle, PlayerUpdate},
    theme::C_BG,
    widgets::{
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    StationsLoaded {
        ticket: Ticket,
        result: Result<Vec<Station>, FetchError>,
        mirror: Option<Mirror>,
    },
    /// The search input has been quiet for the debounce delay.
    SearchDue,
    MirrorReselected(Mirror),
    Player(PlayerUpdate),
}

const WAVEFORM_H: u16 = 5;

pub struct App {
    config: Config,
    prefs: Preferences,
    directory: Arc<Directory<HttpTransport>>,
    state: AppState,

    header: Header,
    filter_bar: FilterBar,
    waveform: Waveform,
    station_list: StationList,
    toast: ToastManager,

    debouncer: SearchDebouncer,
    gate: RequestGate,
    player: PlayerHandle,
    player_rx: Option<mpsc::Receiver<PlayerUpdate>>,
    tx: mpsc::Sender<AppMessage>,
    rx: Option<mpsc::Receiver<AppMessage>>,

    /// Where the station list was last drawn, for mouse hit-testing.
    station_area: Rect,
    should_quit: bool,
}

impl App {
    /// Must be called from within the tokio runtime; the player actor starts here.
    pub fn new(
        config: Config,
        prefs: Preferences,
        directory: Arc<Directory<HttpTransport>>,
    ) -> Self {
        let filter = FilterState::with_country(config.search.default_country.clone());
        let session = PlaybackSession::new(prefs.load_volume());
        let state = AppState::new(filter, prefs.favorites(), session);

        let (tx, rx) = mpsc::channel::<AppMessage>(256);
        let (player_tx, player_rx) = mpsc::channel::<PlayerUpdate>(64);
        let player = spawn_player(player_tx);

        Self {
            debouncer: SearchDebouncer::new(config.search.debounce()),
            config,
            prefs,
            directory,
            state,
            header: Header::new(),
            filter_bar: FilterBar::new(),
            waveform: Waveform::new(),
            station_list: StationList::new(),
            toast: ToastManager::new(),
            gate: RequestGate::new(),
            player,
            player_rx: Some(player_rx),
            tx,
            rx: Some(rx),
            station_area: Rect::default(),
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        let (Some(mut rx), Some(mut player_rx)) = (self.rx.take(), self.player_rx.take()) else {
            anyhow::bail!("app is already running");
        };

        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // Toast expiry, spinner and waveform animation
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        self.start_fetch();

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    needs_redraw = self.handle_message(msg).await;
                }

                Some(update) = player_rx.recv() => {
                    needs_redraw = self.handle_message(AppMessage::Player(update)).await;
                }

                _ = ui_tick.tick() => {
                    let tick_actions: Vec<Action> = {
                        let s = &self.state;
                        let mut all = Vec::new();
                        all.extend(self.header.tick(s));
                        all.extend(self.filter_bar.tick(s));
                        all.extend(self.waveform.tick(s));
                        all.extend(self.station_list.tick(s));
                        all
                    };
                    for action in tick_actions {
                        self.dispatch(action).await;
                    }
                    self.toast.tick();
                    needs_redraw = true;
                }
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        self.debouncer.cancel();
        self.player.send(PlayerCommand::Stop).await;
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        info!("retro-radio exiting");

        Ok(())
    }

    /// Returns whether the screen needs redrawing.
    async fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                if key.kind == KeyEventKind::Release {
                    return false;
                }
                for action in self.handle_key(key) {
                    self.dispatch(action).await;
                }
                true
            }
            AppMessage::Event(Event::Mouse(mouse)) => {
                for action in self.handle_mouse(mouse) {
                    self.dispatch(action).await;
                }
                true
            }
            AppMessage::Event(Event::Resize(_, _)) => true,
            AppMessage::Event(_) => false,

            AppMessage::StationsLoaded {
                ticket,
                result,
                mirror,
            } => {
                if !self.gate.is_current(&ticket) {
                    debug!("[app] dropping stale station listing");
                    return false;
                }
                if mirror.is_some() {
                    self.state.mirror = mirror;
                }
                match result {
                    Ok(stations) => {
                        info!("[app] {} stations listed", stations.len());
                        self.state.set_stations(stations);
                    }
                    Err(e) => {
                        error!("[app] {}", e);
                        self.state.set_stations(Vec::new());
                        self.state.listing = Listing::Failed;
                    }
                }
                self.station_list.sync_stations(&self.state);
                true
            }

            AppMessage::SearchDue => {
                self.start_fetch();
                true
            }

            AppMessage::MirrorReselected(mirror) => {
                self.toast.dismiss_spinner();
                self.toast.info(format!("using {}", mirror));
                self.state.mirror = Some(mirror);
                self.start_fetch();
                true
            }

            AppMessage::Player(update) => {
                self.on_player_update(update);
                true
            }
        }
    }

    fn on_player_update(&mut self, update: PlayerUpdate) {
        match update {
            PlayerUpdate::Status { uuid, status } => {
                if self.state.session.is_playing(&uuid) {
                    self.state.session.set_status(status);
                }
            }
            PlayerUpdate::Failed { uuid, reason } => {
                warn!("[app] playback of {} failed: {}", uuid, reason);
                let name = self
                    .state
                    .station(&uuid)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| uuid.clone());
                if self.state.session.is_playing(&uuid) {
                    self.state.session.fail();
                }
                self.state.hidden.insert(uuid);
                self.station_list.sync_hidden(&self.state);
                self.toast.warning(format!("Failed to play {}", name));
            }
        }
    }

    /// Issues a new listing request for the current filters. Any pending
    /// debounced search is dropped and older in-flight results become stale.
    fn start_fetch(&mut self) {
        self.debouncer.cancel();
        let ticket = self.gate.issue();
        self.state.listing = Listing::Loading;

        let directory = Arc::clone(&self.directory);
        let filter = self.state.filter.clone();
        let tx = self.tx.clone();
        debug!("[app] fetching stations for {:?}", filter);
        tokio::spawn(async move {
            let result = directory.fetch_stations(&filter).await;
            let mirror = directory.current_mirror();
            let _ = tx
                .send(AppMessage::StationsLoaded {
                    ticket,
                    result,
                    mirror,
                })
                .await;
        });
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            return vec![Action::Quit];
        }

        // The search input captures everything while open
        if self.state.input_mode == InputMode::Search {
            return self.filter_bar.handle_key(key, &self.state);
        }

        let step = self.config.player.volume_step as i16;
        match key.code {
            KeyCode::Char('q') => return vec![Action::Quit],
            KeyCode::Char(' ') => return vec![Action::TogglePause],
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => {
                return vec![Action::VolumeStep(step)]
            }
            KeyCode::Left | KeyCode::Char('-') => return vec![Action::VolumeStep(-step)],
            KeyCode::Char('m') => return vec![Action::Mute],
            KeyCode::Char('c') => return vec![Action::CycleCountry(Step::Next)],
            KeyCode::Char('C') => return vec![Action::CycleCountry(Step::Prev)],
            KeyCode::Char('g') => return vec![Action::CycleGenre(Step::Next)],
            KeyCode::Char('G') => return vec![Action::CycleGenre(Step::Prev)],
            KeyCode::Char('F') => return vec![Action::ToggleFavoritesOnly],
            KeyCode::Char('M') => return vec![Action::ReselectMirror],
            KeyCode::Char('r') => return vec![Action::Refetch],
            KeyCode::Char('K') => return vec![Action::ToggleKeys],
            _ => {}
        }

        self.station_list.handle_key(key, &self.state)
    }

    // ── Mouse handling ────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        let is_click = matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        );
        if !is_click {
            return vec![];
        }
        let r = self.station_area;
        let inside = r.width > 0
            && r.height > 0
            && event.column >= r.x
            && event.column < r.x + r.width
            && event.row >= r.y
            && event.row < r.y + r.height;
        if inside {
            return self.station_list.handle_mouse(event, r, &self.state);
        }
        vec![]
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    async fn dispatch(&mut self, action: Action) {
        // Components see the action first so they can react to mode changes
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.filter_bar.on_action(&action, s));
            out.extend(self.station_list.on_action(&action, s));
            out
        };

        self.apply_action(action).await;

        for a in secondary {
            self.apply_action(a).await;
        }
    }

    async fn apply_action(&mut self, action: Action) {
        if action != Action::Noop {
            debug!("apply_action: {:?}", action);
        }
        match action {
            // ── Playback ──────────────────────────────────────────────────────
            Action::Play(uuid) => {
                let Some(station) = self.state.station(&uuid).cloned() else {
                    warn!("[app] play: unknown station {}", uuid);
                    return;
                };
                if station.stream_url.is_empty() {
                    self.on_player_update(PlayerUpdate::Failed {
                        uuid,
                        reason: "station has no stream url".to_string(),
                    });
                    return;
                }
                self.state.session.start(&station);
                let volume = self.state.session.effective_volume();
                self.player
                    .send(PlayerCommand::Play {
                        uuid: station.uuid,
                        url: station.stream_url,
                        volume,
                    })
                    .await;
            }
            Action::Stop => {
                self.state.session.stop();
                self.player.send(PlayerCommand::Stop).await;
            }
            Action::TogglePause => {
                if let Some(pause) = self.state.session.toggle_pause() {
                    self.player.send(PlayerCommand::SetPause(pause)).await;
                }
            }
            Action::VolumeStep(delta) => {
                let volume = self.state.session.adjust_volume(delta);
                if let Err(e) = self.prefs.save_volume(volume) {
                    warn!("[app] could not save volume: {}", e);
                }
                let effective = self.state.session.effective_volume();
                self.player.send(PlayerCommand::SetVolume(effective)).await;
            }
            Action::Mute => {
                self.state.session.toggle_mute();
                let effective = self.state.session.effective_volume();
                self.player.send(PlayerCommand::SetVolume(effective)).await;
            }

            // ── Filters ───────────────────────────────────────────────────────
            Action::CycleCountry(step) => {
                let next = cycle(&self.config.search.countries, &self.state.filter.country, step);
                self.state.filter.set_country(next);
                self.start_fetch();
            }
            Action::CycleGenre(step) => {
                let next = cycle(&self.config.search.genres, &self.state.filter.genre_tag, step);
                self.state.filter.select_genre(next);
                self.start_fetch();
            }
            Action::ToggleFavoritesOnly => {
                self.state.filter.toggle_favorites_only();
                self.start_fetch();
            }
            Action::OpenSearch => {
                self.state.input_mode = InputMode::Search;
            }
            Action::CloseSearch => {
                self.state.input_mode = InputMode::Normal;
            }
            Action::SearchChanged(term) => {
                self.state.filter.set_search_term(term);
                let tx = self.tx.clone();
                self.debouncer.schedule(async move {
                    let _ = tx.send(AppMessage::SearchDue).await;
                });
            }

            // ── Directory ─────────────────────────────────────────────────────
            Action::Refetch => self.start_fetch(),
            Action::ReselectMirror => {
                self.toast.spinner("finding another mirror…");
                let directory = Arc::clone(&self.directory);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let mirror = directory.reselect_mirror().await;
                    let _ = tx.send(AppMessage::MirrorReselected(mirror)).await;
                });
            }

            // ── Favorites ─────────────────────────────────────────────────────
            Action::ToggleFavorite(uuid) => match self.prefs.toggle_favorite(&uuid) {
                Ok(starred) => {
                    self.state.favorites = self.prefs.favorites();
                    let name = self
                        .state
                        .station(&uuid)
                        .map(|s| s.name.clone())
                        .unwrap_or(uuid);
                    if starred {
                        self.toast.success(format!("★ {}", name));
                    } else {
                        self.toast.info(format!("☆ {}", name));
                    }
                    if self.state.filter.favorites_only {
                        self.start_fetch();
                    }
                }
                Err(e) => {
                    error!("[app] could not save favorites: {}", e);
                    self.toast.error(format!("could not save favorites: {}", e));
                }
            },

            // ── UI ────────────────────────────────────────────────────────────
            Action::ToggleKeys => {
                self.state.show_keys_bar = !self.state.show_keys_bar;
            }
            Action::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(()) => {
                        let display = if text.chars().count() > 40 {
                            format!("{}…", text.chars().take(40).collect::<String>())
                        } else {
                            text.clone()
                        };
                        self.toast.success(format!("copied: {}", display));
                    }
                    Err(e) => {
                        warn!("clipboard error: {}", e);
                        self.toast.error(format!("clipboard error: {}", e));
                    }
                }
            }

            // ── System ────────────────────────────────────────────────────────
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Noop => {}
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let status_h = if self.state.show_keys_bar { 1u16 } else { 0 };
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(self.header.min_height()),
                Constraint::Length(self.filter_bar.min_height()),
                Constraint::Length(WAVEFORM_H.max(self.waveform.min_height())),
                Constraint::Min(self.station_list.min_height()),
                Constraint::Length(status_h),
            ])
            .split(area);

        self.header.draw(frame, outer[0], false, &self.state);
        let searching = self.state.input_mode == InputMode::Search;
        self.filter_bar.draw(frame, outer[1], searching, &self.state);
        self.waveform.draw(frame, outer[2], false, &self.state);
        self.station_list.draw(frame, outer[3], !searching, &self.state);
        self.station_area = outer[3];

        if self.state.show_keys_bar {
            status_bar::draw_keys_bar(
                frame,
                outer[4],
                self.state.input_mode,
                self.state.mirror.as_ref(),
            );
        }

        self.toast.draw(frame, area);
    }
}
