use serde::{Deserialize, Serialize};

use crate::model::Station;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle, // nothing loaded / explicitly stopped
    Connecting, // loadfile sent, stream not flowing yet
    Playing,
    Paused,
    Error, // stream failed to start or died
}

impl PlaybackStatus {
    /// Whether a stream is loaded, flowing or not.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Playing | Self::Paused)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub uuid: String,
    pub name: String,
    pub stream_url: String,
}

/// What is playing and how loud. Only `volume` outlives the process; the
/// caller persists it.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    now_playing: Option<NowPlaying>,
    status: PlaybackStatus,
    volume: u8,
    muted: bool,
    /// Set only by `toggle_mute`; a volume stepped down to zero has no
    /// level to come back to.
    muted_by_toggle: bool,
    volume_before_mute: u8,
}

impl PlaybackSession {
    pub fn new(volume: u8) -> Self {
        let volume = volume.min(100);
        Self {
            now_playing: None,
            status: PlaybackStatus::Idle,
            volume,
            muted: false,
            muted_by_toggle: false,
            volume_before_mute: volume,
        }
    }

    pub fn start(&mut self, station: &Station) -> &NowPlaying {
        self.status = PlaybackStatus::Connecting;
        self.now_playing.insert(NowPlaying {
            uuid: station.uuid.clone(),
            name: station.name.clone(),
            stream_url: station.stream_url.clone(),
        })
    }

    pub fn set_status(&mut self, status: PlaybackStatus) {
        self.status = status;
    }

    /// The pause state to request next, or `None` when nothing is loaded.
    pub fn toggle_pause(&self) -> Option<bool> {
        match self.status {
            PlaybackStatus::Playing | PlaybackStatus::Connecting => Some(true),
            PlaybackStatus::Paused => Some(false),
            PlaybackStatus::Idle | PlaybackStatus::Error => None,
        }
    }

    pub fn stop(&mut self) {
        self.status = PlaybackStatus::Idle;
        self.now_playing = None;
    }

    /// Marks the current stream as failed and forgets it. Returns the
    /// station that failed.
    pub fn fail(&mut self) -> Option<NowPlaying> {
        self.status = PlaybackStatus::Error;
        self.now_playing.take()
    }

    /// Sets the volume from user input. Raising it above zero lifts a mute;
    /// dragging it to zero counts as muting.
    pub fn set_volume(&mut self, volume: u8) -> u8 {
        let volume = volume.min(100);
        self.volume = volume;
        if volume > 0 && self.muted {
            self.muted = false;
            self.muted_by_toggle = false;
        } else if volume == 0 && !self.muted {
            self.muted = true;
        }
        volume
    }

    /// Steps the volume by `delta`. After `toggle_mute` the step starts from
    /// the remembered level, otherwise from the current one.
    pub fn adjust_volume(&mut self, delta: i16) -> u8 {
        let base = if self.muted_by_toggle {
            self.volume_before_mute
        } else {
            self.volume
        };
        let next = (base as i16 + delta).clamp(0, 100) as u8;
        self.set_volume(next)
    }

    pub fn toggle_mute(&mut self) -> bool {
        if self.muted {
            self.muted = false;
            self.volume = self.volume_before_mute;
        } else {
            self.muted = true;
            self.volume_before_mute = self.volume;
            self.volume = 0;
        }
        self.muted_by_toggle = self.muted;
        self.muted
    }

    /// Volume to hand to the audio engine.
    pub fn effective_volume(&self) -> u8 {
        if self.muted {
            0
        } else {
            self.volume
        }
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn now_playing(&self) -> Option<&NowPlaying> {
        self.now_playing.as_ref()
    }

    pub fn is_playing(&self, uuid: &str) -> bool {
        self.now_playing.as_ref().is_some_and(|n| n.uuid == uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station() -> Station {
        serde_json::from_value(serde_json::json!({
            "stationuuid": "u1",
            "name": "Night Jazz",
            "url_resolved": "http://stream.example/jazz"
        }))
        .unwrap()
    }

    #[test]
    fn test_start_then_fail_clears_station() {
        let mut session = PlaybackSession::new(70);
        assert_eq!(session.toggle_pause(), None);

        session.start(&station());
        assert_eq!(session.status(), PlaybackStatus::Connecting);
        assert!(session.is_playing("u1"));
        assert_eq!(session.toggle_pause(), Some(true));

        session.set_status(PlaybackStatus::Paused);
        assert_eq!(session.toggle_pause(), Some(false));

        let failed = session.fail().unwrap();
        assert_eq!(failed.stream_url, "http://stream.example/jazz");
        assert_eq!(session.status(), PlaybackStatus::Error);
        assert!(session.now_playing().is_none());
        assert!(!session.status().is_active());
    }

    #[test]
    fn test_mute_remembers_volume() {
        let mut session = PlaybackSession::new(60);
        assert!(session.toggle_mute());
        assert_eq!(session.effective_volume(), 0);
        assert!(!session.toggle_mute());
        assert_eq!(session.effective_volume(), 60);
    }

    #[test]
    fn test_volume_input_drives_mute() {
        let mut session = PlaybackSession::new(60);
        session.toggle_mute();
        assert_eq!(session.set_volume(30), 30);
        assert!(!session.is_muted());

        session.set_volume(0);
        assert!(session.is_muted());
        assert_eq!(session.set_volume(150), 100);
        assert!(!session.is_muted());
    }

    #[test]
    fn test_adjust_volume_from_mute_uses_remembered_level() {
        let mut session = PlaybackSession::new(40);
        session.toggle_mute();
        assert_eq!(session.adjust_volume(5), 45);
        assert!(!session.is_muted());
        assert_eq!(session.adjust_volume(-100), 0);
        assert!(session.is_muted());
        assert_eq!(session.adjust_volume(120), 100);
    }

    #[test]
    fn test_stepping_down_to_zero_and_back_up() {
        let mut session = PlaybackSession::new(60);
        for _ in 0..12 {
            session.adjust_volume(-5);
        }
        assert_eq!(session.volume(), 0);
        assert!(session.is_muted());

        assert_eq!(session.adjust_volume(5), 5);
        assert!(!session.is_muted());
        assert_eq!(session.effective_volume(), 5);
        assert_eq!(session.adjust_volume(5), 10);
    }
}
