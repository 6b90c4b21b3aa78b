use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::ApiConfig;
use crate::favorites::resolve_favorites;
use crate::mirror::MirrorSelector;
use crate::model::{FilterState, Mirror, Station};
use crate::prefs::Preferences;
use crate::query::{build_query, QueryParameters};
use crate::transport::{Transport, TransportError};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("station search failed on {mirror} after reselecting")]
    SearchFetchFailure {
        mirror: Mirror,
        #[source]
        source: TransportError,
    },
}

/// Entry point for station listings: owns mirror selection and retries.
pub struct Directory<T> {
    transport: Arc<T>,
    mirrors: MirrorSelector<T>,
    prefs: Preferences,
    scheme: String,
}

impl<T: Transport> Directory<T> {
    pub fn new(transport: Arc<T>, prefs: Preferences, api: &ApiConfig) -> Self {
        let mirrors = MirrorSelector::new(Arc::clone(&transport), prefs.clone(), api);
        Self {
            transport,
            mirrors,
            prefs,
            scheme: api.scheme.clone(),
        }
    }

    pub fn current_mirror(&self) -> Option<Mirror> {
        self.mirrors.current()
    }

    /// Drops the current mirror and discovers another one.
    pub async fn reselect_mirror(&self) -> Mirror {
        self.mirrors.select(true).await
    }

    /// Stations matching `filter`, in the order the API returns them.
    ///
    /// Favorites-only across all countries resolves the starred stations one
    /// by one. Any other listing is a search; a failed search is retried once
    /// on a freshly selected mirror.
    pub async fn fetch_stations(&self, filter: &FilterState) -> Result<Vec<Station>, FetchError> {
        if filter.lists_favorites_by_id() {
            let favorites = self.prefs.favorites();
            return Ok(self.fetch_favorites(favorites.ids()).await);
        }

        let query = build_query(filter);
        let mirror = self.mirrors.select(false).await;
        let stations = match self.search(&query, &mirror).await {
            Ok(stations) => stations,
            Err(e) => {
                warn!("[directory] search on {} failed: {}, retrying", mirror, e);
                let retry_mirror = self.mirrors.select(true).await;
                match self.search(&query, &retry_mirror).await {
                    Ok(stations) => stations,
                    Err(source) => {
                        error!("[directory] retry on {} failed: {}", retry_mirror, source);
                        return Err(FetchError::SearchFetchFailure {
                            mirror: retry_mirror,
                            source,
                        });
                    }
                }
            }
        };

        if filter.favorites_only {
            let favorites = self.prefs.favorites();
            return Ok(stations
                .into_iter()
                .filter(|s| favorites.contains(&s.uuid))
                .collect());
        }
        Ok(stations)
    }

    /// Resolves `ids` by identifier. Makes no requests for an empty list.
    pub async fn fetch_favorites(&self, ids: &[String]) -> Vec<Station> {
        if ids.is_empty() {
            return Vec::new();
        }
        let mirror = self.mirrors.select(false).await;
        resolve_favorites(self.transport.as_ref(), &mirror, &self.scheme, ids).await
    }

    async fn search(
        &self,
        query: &QueryParameters,
        mirror: &Mirror,
    ) -> Result<Vec<Station>, TransportError> {
        let url = query.search_url(mirror, &self.scheme)?;
        debug!("[directory] GET {}", url);
        let stations: Vec<Station> = self.transport.get_json(url).await?;
        info!("[directory] {} stations from {}", stations.len(), mirror);
        Ok(stations)
    }
}
