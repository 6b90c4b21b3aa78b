use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::model::{Mirror, Station};
use crate::query::station_by_uuid_url;
use crate::transport::Transport;

/// Looks up each favorite by identifier on `mirror`, concurrently.
///
/// The result keeps the order of `ids`. Identifiers that fail or that the
/// mirror no longer knows are dropped.
pub async fn resolve_favorites<T: Transport>(
    transport: &T,
    mirror: &Mirror,
    scheme: &str,
    ids: &[String],
) -> Vec<Station> {
    if ids.is_empty() {
        return Vec::new();
    }

    let lookups: Vec<_> = ids
        .iter()
        .map(|id| lookup(transport, mirror, scheme, id))
        .collect();
    let stations: Vec<Station> = join_all(lookups).await.into_iter().flatten().collect();
    debug!(
        "[favorites] resolved {}/{} favorites on {}",
        stations.len(),
        ids.len(),
        mirror
    );
    stations
}

async fn lookup<T: Transport>(
    transport: &T,
    mirror: &Mirror,
    scheme: &str,
    id: &str,
) -> Option<Station> {
    let url = match station_by_uuid_url(mirror, scheme, id) {
        Ok(url) => url,
        Err(e) => {
            warn!("[favorites] skipping {}: {}", id, e);
            return None;
        }
    };
    match transport.get_json::<Vec<Station>>(url).await {
        Ok(records) => {
            let station = records.into_iter().next();
            if station.is_none() {
                warn!("[favorites] {} is unknown to {}", id, mirror);
            }
            station
        }
        Err(e) => {
            warn!("[favorites] failed to fetch {}: {}", id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{station_json, MockTransport, Reply};
    use serde_json::json;
    use std::time::Duration;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn uuid_of(url: &reqwest::Url) -> String {
        url.path_segments()
            .and_then(|mut s| s.next_back())
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn test_no_ids_no_requests() {
        let transport = MockTransport::new(|_| Reply::Status(500));
        let stations =
            resolve_favorites(transport.as_ref(), &Mirror::new("a.example"), "https", &[]).await;
        assert!(stations.is_empty());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_follows_ids_not_completion() {
        let transport = MockTransport::new(|url| {
            let uuid = uuid_of(url);
            let delay = match uuid.as_str() {
                "first" => 300,
                "second" => 10,
                _ => 100,
            };
            Reply::Delayed(
                Duration::from_millis(delay),
                Box::new(Reply::Json(json!([station_json(&uuid, &uuid)]))),
            )
        });

        let stations = resolve_favorites(
            transport.as_ref(),
            &Mirror::new("a.example"),
            "https",
            &ids(&["first", "second", "third"]),
        )
        .await;

        let names: Vec<&str> = stations.iter().map(|s| s.uuid.as_str()).collect();
        assert_eq!(names, ["first", "second", "third"]);
        assert_eq!(transport.requests_to("/json/stations/byuuid/").len(), 3);
    }

    #[tokio::test]
    async fn test_failures_and_unknown_ids_are_dropped() {
        let transport = MockTransport::new(|url| match uuid_of(url).as_str() {
            "gone" => Reply::Json(json!([])),
            "broken" => Reply::Status(502),
            "odd" => Reply::Json(json!({"not": "a list"})),
            uuid => Reply::Json(json!([station_json(uuid, "ok")])),
        });

        let stations = resolve_favorites(
            transport.as_ref(),
            &Mirror::new("a.example"),
            "https",
            &ids(&["gone", "keep-1", "broken", "odd", "keep-2"]),
        )
        .await;

        let uuids: Vec<&str> = stations.iter().map(|s| s.uuid.as_str()).collect();
        assert_eq!(uuids, ["keep-1", "keep-2"]);
        assert_eq!(transport.request_count(), 5);
    }
}
