//! Player: the actor that owns mpv and turns its events into playback status.
//!
//! The App sends `PlayerCommand`s and receives `PlayerUpdate`s; it never
//! talks to mpv directly.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use retro_core::playback::PlaybackStatus;

use crate::mpv::{MpvDriver, MpvEvent, MpvHandle, OBS_CORE_IDLE, OBS_PAUSE};

/// A stream that has not produced audio after this long counts as failed.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

const HEARTBEAT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    Play {
        uuid: String,
        url: String,
        volume: u8,
    },
    Stop,
    SetPause(bool),
    SetVolume(u8),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerUpdate {
    Status {
        uuid: String,
        status: PlaybackStatus,
    },
    /// The stream for `uuid` could not be started or died.
    Failed { uuid: String, reason: String },
}

/// Derives playback status from what mpv reports.
///
/// Pure state; callers pass the current instant so the connect timeout can
/// be driven without a clock.
#[derive(Debug)]
pub struct StatusTracker {
    intend_playing: bool,
    core_idle: Option<bool>,
    paused: bool,
    connecting_since: Option<Instant>,
    failed: bool,
    last_status: PlaybackStatus,
    timeout: Duration,
}

impl StatusTracker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            intend_playing: false,
            core_idle: None,
            paused: false,
            connecting_since: None,
            failed: false,
            last_status: PlaybackStatus::Idle,
            timeout,
        }
    }

    /// A new stream was requested.
    pub fn begin(&mut self) {
        self.intend_playing = true;
        self.core_idle = None;
        self.paused = false;
        self.connecting_since = None;
        self.failed = false;
    }

    pub fn stop(&mut self) {
        self.intend_playing = false;
        self.connecting_since = None;
        self.failed = false;
    }

    /// Marks the stream as failed; status stays `Error` until the next
    /// `begin` or `stop`.
    pub fn fail(&mut self) {
        self.intend_playing = false;
        self.connecting_since = None;
        self.failed = true;
    }

    pub fn set_core_idle(&mut self, idle: Option<bool>) {
        self.core_idle = idle;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn on_start_file(&mut self) {
        self.connecting_since = None;
        // flips to false once audio flows
        self.core_idle = Some(true);
    }

    /// Returns true when the end of the file is a failure of a stream the
    /// user still wants to hear.
    pub fn on_end_file(&mut self, reason: &str) -> bool {
        self.core_idle = Some(true);
        reason == "error" && self.intend_playing && !self.paused
    }

    pub fn is_active(&self) -> bool {
        self.intend_playing
    }

    pub fn derive(&mut self, now: Instant) -> PlaybackStatus {
        if self.failed {
            return PlaybackStatus::Error;
        }
        if !self.intend_playing {
            self.connecting_since = None;
            return PlaybackStatus::Idle;
        }
        if self.paused {
            self.connecting_since = None;
            return PlaybackStatus::Paused;
        }
        if self.core_idle == Some(false) {
            self.connecting_since = None;
            return PlaybackStatus::Playing;
        }
        let since = *self.connecting_since.get_or_insert(now);
        if now.saturating_duration_since(since) >= self.timeout {
            PlaybackStatus::Error
        } else {
            PlaybackStatus::Connecting
        }
    }

    /// The new status if it differs from the last one reported.
    pub fn update(&mut self, now: Instant) -> Option<PlaybackStatus> {
        let status = self.derive(now);
        if status == self.last_status {
            return None;
        }
        debug!("player: status {:?} → {:?}", self.last_status, status);
        self.last_status = status;
        Some(status)
    }
}

/// Sender half used by the App.
#[derive(Clone)]
pub struct PlayerHandle {
    tx: mpsc::Sender<PlayerCommand>,
}

impl PlayerHandle {
    pub async fn send(&self, cmd: PlayerCommand) {
        if self.tx.send(cmd).await.is_err() {
            error!("player: actor is gone");
        }
    }
}

/// Starts the player actor. Updates are delivered on `update_tx`.
pub fn spawn_player(update_tx: mpsc::Sender<PlayerUpdate>) -> PlayerHandle {
    let (tx, rx) = mpsc::channel(64);
    let (mpv_tx, mpv_rx) = mpsc::channel(64);
    let core = PlayerCore {
        driver: MpvDriver::new(),
        handle: None,
        mpv_tx,
        tracker: StatusTracker::new(CONNECT_TIMEOUT),
        current: None,
        update_tx,
    };
    tokio::spawn(core.run(rx, mpv_rx));
    PlayerHandle { tx }
}

struct PlayerCore {
    driver: MpvDriver,
    handle: Option<MpvHandle>,
    mpv_tx: mpsc::Sender<MpvEvent>,
    tracker: StatusTracker,
    current: Option<String>,
    update_tx: mpsc::Sender<PlayerUpdate>,
}

impl PlayerCore {
    async fn run(
        mut self,
        mut cmd_rx: mpsc::Receiver<PlayerCommand>,
        mut mpv_rx: mpsc::Receiver<MpvEvent>,
    ) {
        info!("player: starting");
        let mut heartbeat = tokio::time::interval(HEARTBEAT);
        heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => {
                        if let Err(e) = self.handle_command(cmd).await {
                            warn!("player: command failed: {}", e);
                        }
                    }
                    None => break,
                },
                Some(evt) = mpv_rx.recv() => self.handle_mpv_event(evt).await,
                _ = heartbeat.tick() => {
                    if self.handle.is_some() && !self.driver.process_alive() {
                        warn!("player: mpv process died");
                        self.handle = None;
                        if self.tracker.is_active() {
                            self.fail("audio engine stopped").await;
                        }
                    }
                    // Catches the connect timeout when mpv goes quiet
                    self.publish_status().await;
                }
            }
        }

        info!("player: shutting down");
        if let Some(h) = self.handle.take() {
            let _ = h.stop().await;
        }
        self.driver.kill().await;
    }

    async fn handle_command(&mut self, cmd: PlayerCommand) -> anyhow::Result<()> {
        match cmd {
            PlayerCommand::Play { uuid, url, volume } => {
                info!("player: play {} ({})", uuid, url);
                self.current = Some(uuid);
                self.tracker.begin();
                self.publish_status().await;
                let Some(handle) = self.ensure_handle(volume).await else {
                    self.fail("mpv is not available").await;
                    return Ok(());
                };
                if let Err(e) = handle.load_stream(&url, volume).await {
                    warn!("player: loadfile failed: {}", e);
                    self.fail(&e.to_string()).await;
                }
            }
            PlayerCommand::Stop => {
                self.tracker.stop();
                self.publish_status().await;
                self.current = None;
                if let Some(h) = self.handle.as_ref() {
                    h.stop().await?;
                }
            }
            PlayerCommand::SetPause(paused) => {
                if let Some(h) = self.handle.as_ref() {
                    h.set_pause(paused).await?;
                }
            }
            PlayerCommand::SetVolume(volume) => {
                if let Some(h) = self.handle.as_ref() {
                    h.set_volume(volume).await?;
                }
            }
        }
        Ok(())
    }

    async fn handle_mpv_event(&mut self, evt: MpvEvent) {
        if let Some((obs_id, data)) = evt.as_property_change() {
            match obs_id {
                OBS_CORE_IDLE => self.tracker.set_core_idle(data.as_bool()),
                OBS_PAUSE => self.tracker.set_paused(data.as_bool().unwrap_or(false)),
                _ => return,
            }
            self.publish_status().await;
            return;
        }

        if let Some(reason) = evt.end_file_reason() {
            info!("player: end-file reason={}", reason);
            let failed = self.tracker.on_end_file(reason);
            if failed {
                let reason = evt
                    .raw
                    .get("file_error")
                    .and_then(|v| v.as_str())
                    .unwrap_or(reason)
                    .to_string();
                self.fail(&reason).await;
            } else {
                self.publish_status().await;
            }
            return;
        }

        match evt.event_name() {
            Some("start-file") => {
                self.tracker.on_start_file();
                self.publish_status().await;
            }
            Some("file-loaded") => {
                if let Some(h) = self.handle.clone() {
                    tokio::spawn(async move { h.observe_properties().await });
                }
            }
            _ => {}
        }
    }

    async fn ensure_handle(&mut self, volume: u8) -> Option<MpvHandle> {
        if self.handle.is_some() && !self.driver.process_alive() {
            warn!("player: mpv process died, dropping handle");
            self.handle = None;
        }
        if self.handle.is_none() {
            let handle = match self.driver.spawn_and_connect(volume, self.mpv_tx.clone()).await {
                Ok(h) => h,
                Err(e) => {
                    error!("player: failed to start mpv: {}", e);
                    return None;
                }
            };
            handle.observe_properties().await;
            self.handle = Some(handle);
        }
        self.handle.clone()
    }

    async fn fail(&mut self, reason: &str) {
        self.tracker.fail();
        let _ = self.tracker.update(Instant::now());
        if let Some(h) = self.handle.as_ref() {
            let _ = h.stop().await;
        }
        if let Some(uuid) = self.current.take() {
            warn!("player: {} failed: {}", uuid, reason);
            let _ = self
                .update_tx
                .send(PlayerUpdate::Failed {
                    uuid,
                    reason: reason.to_string(),
                })
                .await;
        }
    }

    async fn publish_status(&mut self) {
        let Some(status) = self.tracker.update(Instant::now()) else {
            return;
        };
        if status == PlaybackStatus::Error {
            // Connect timeout
            self.fail("no audio within 15s").await;
            return;
        }
        if let Some(uuid) = self.current.clone() {
            let _ = self
                .update_tx
                .send(PlayerUpdate::Status { uuid, status })
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> (StatusTracker, Instant) {
        (StatusTracker::new(CONNECT_TIMEOUT), Instant::now())
    }

    #[test]
    fn test_connecting_then_playing() {
        let (mut t, now) = tracker();
        assert_eq!(t.update(now), None);

        t.begin();
        assert_eq!(t.update(now), Some(PlaybackStatus::Connecting));
        t.on_start_file();
        assert_eq!(t.update(now), None);

        t.set_core_idle(Some(false));
        assert_eq!(t.update(now), Some(PlaybackStatus::Playing));

        t.set_paused(true);
        assert_eq!(t.update(now), Some(PlaybackStatus::Paused));
        t.set_paused(false);
        assert_eq!(t.update(now), Some(PlaybackStatus::Playing));

        t.stop();
        assert_eq!(t.update(now), Some(PlaybackStatus::Idle));
    }

    #[test]
    fn test_silent_stream_times_out() {
        let (mut t, now) = tracker();
        t.begin();
        assert_eq!(t.derive(now), PlaybackStatus::Connecting);
        assert_eq!(
            t.derive(now + Duration::from_secs(14)),
            PlaybackStatus::Connecting
        );
        assert_eq!(
            t.derive(now + Duration::from_secs(15)),
            PlaybackStatus::Error
        );
    }

    #[test]
    fn test_pause_suspends_connect_timer() {
        let (mut t, now) = tracker();
        t.begin();
        t.derive(now);
        t.set_paused(true);
        assert_eq!(t.derive(now + Duration::from_secs(20)), PlaybackStatus::Paused);

        t.set_paused(false);
        assert_eq!(
            t.derive(now + Duration::from_secs(21)),
            PlaybackStatus::Connecting
        );
    }

    #[test]
    fn test_end_file_error_is_failure_only_while_wanted() {
        let (mut t, now) = tracker();
        assert!(!t.on_end_file("error"));

        t.begin();
        for reason in ["eof", "stop", "quit", "redirect", "unknown"] {
            assert!(!t.on_end_file(reason), "{reason}");
        }
        assert!(t.on_end_file("error"));

        t.fail();
        assert_eq!(t.derive(now), PlaybackStatus::Error);
        assert!(!t.on_end_file("error"));

        t.begin();
        assert_eq!(t.derive(now), PlaybackStatus::Connecting);
    }
}
