use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::ApiConfig;
use crate::model::{Mirror, MirrorRecord};
use crate::prefs::Preferences;
use crate::transport::{parse_url, Transport, TransportError};

/// Picks the API mirror used for station requests and remembers it.
pub struct MirrorSelector<T> {
    transport: Arc<T>,
    prefs: Preferences,
    discovery_url: String,
    fallback: Mirror,
}

impl<T: Transport> MirrorSelector<T> {
    pub fn new(transport: Arc<T>, prefs: Preferences, api: &ApiConfig) -> Self {
        Self {
            transport,
            prefs,
            discovery_url: api.discovery_url.clone(),
            fallback: Mirror::new(api.fallback_mirror.clone()),
        }
    }

    /// The persisted mirror, if any. Never touches the network.
    pub fn current(&self) -> Option<Mirror> {
        self.prefs.load_mirror()
    }

    /// Returns the persisted mirror unless `force_new` is set or nothing is
    /// persisted; otherwise discovers a new one. Discovery problems fall back
    /// to the configured default mirror.
    pub async fn select(&self, force_new: bool) -> Mirror {
        if !force_new {
            if let Some(mirror) = self.current() {
                debug!("[mirror] using persisted {}", mirror);
                return mirror;
            }
        }

        let mirror = match self.discover().await {
            Ok(records) => match pick(records) {
                Some(mirror) => mirror,
                None => {
                    warn!(
                        "[mirror] discovery listed no usable mirrors, falling back to {}",
                        self.fallback
                    );
                    self.fallback.clone()
                }
            },
            Err(e) => {
                warn!(
                    "[mirror] discovery failed ({}), falling back to {}",
                    e, self.fallback
                );
                self.fallback.clone()
            }
        };

        if let Err(e) = self.prefs.save_mirror(&mirror) {
            error!("[mirror] failed to persist {}: {}", mirror, e);
        }
        info!("[mirror] selected {}", mirror);
        mirror
    }

    async fn discover(&self) -> Result<Vec<MirrorRecord>, TransportError> {
        let url = parse_url(&self.discovery_url)?;
        self.transport.get_json(url).await
    }
}

fn pick(records: Vec<MirrorRecord>) -> Option<Mirror> {
    let names: Vec<String> = records
        .into_iter()
        .map(|r| r.name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    names
        .choose(&mut rand::thread_rng())
        .map(|name| Mirror::new(name.clone()))
}
