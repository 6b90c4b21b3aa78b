use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use retro_core::config::ApiConfig;
use retro_core::directory::{Directory, FetchError};
use retro_core::model::{FilterState, Mirror};
use retro_core::prefs::{JsonFileStore, Preferences};
use retro_core::transport::HttpTransport;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

fn station(uuid: &str, name: &str) -> Value {
    json!({
        "stationuuid": uuid,
        "name": name,
        "tags": "jazz,blues,soul",
        "url_resolved": format!("http://stream.example/{}", uuid),
        "bitrate": 128
    })
}

async fn search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let name = params.get("name").cloned().unwrap_or_default();
    let country = params.get("countrycode").cloned().unwrap_or_default();
    Json(json!([
        station("s1", &format!("{} {}", country, name)),
        station("s2", "Second")
    ]))
}

async fn by_uuid(Path(uuid): Path<String>) -> Result<Json<Value>, StatusCode> {
    match uuid.as_str() {
        "missing" => Ok(Json(json!([]))),
        "broken" => Err(StatusCode::INTERNAL_SERVER_ERROR),
        _ => Ok(Json(json!([station(&uuid, "Favorite")]))),
    }
}

/// Serves discovery and station endpoints. Discovery lists the server
/// itself as the only mirror.
async fn spawn_mirror() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let host = addr.to_string();
    let app = Router::new()
        .route(
            "/json/servers",
            get(move || {
                let host = host.clone();
                async move { Json(json!([{ "name": host }])) }
            }),
        )
        .route("/json/stations/search", get(search))
        .route("/json/stations/byuuid/:uuid", get(by_uuid));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// An address nothing is listening on.
async fn dead_address() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

fn api_config(discovery: SocketAddr) -> ApiConfig {
    ApiConfig {
        discovery_url: format!("http://{}/json/servers", discovery),
        scheme: "http".to_string(),
        connect_timeout_secs: 2,
        request_timeout_secs: 5,
        ..ApiConfig::default()
    }
}

fn directory(api: &ApiConfig, prefs: &Preferences) -> Directory<HttpTransport> {
    let transport = Arc::new(HttpTransport::new(api).unwrap());
    Directory::new(transport, prefs.clone(), api)
}

#[tokio::test]
async fn test_unreachable_mirror_is_replaced() {
    let healthy = spawn_mirror().await;
    let dead = dead_address().await;
    let dir = tempfile::tempdir().unwrap();
    let prefs_path = dir.path().join("prefs.json");
    let prefs = Preferences::new(Arc::new(JsonFileStore::open(&prefs_path)));
    prefs.save_mirror(&Mirror::new(dead.to_string())).unwrap();

    let api = api_config(healthy);
    let mut filter = FilterState::with_country("US");
    filter.set_search_term("late night");
    let stations = directory(&api, &prefs).fetch_stations(&filter).await.unwrap();

    assert_eq!(stations.len(), 2);
    assert_eq!(stations[0].name, "US late night");
    assert_eq!(stations[0].display_tags(2), "jazz, blues");

    let reopened = Preferences::new(Arc::new(JsonFileStore::open(&prefs_path)));
    assert_eq!(reopened.load_mirror(), Some(Mirror::new(healthy.to_string())));
}

#[tokio::test]
async fn test_discovery_down_and_fallback_down() {
    let dead = dead_address().await;
    let api = ApiConfig {
        fallback_mirror: dead.to_string(),
        ..api_config(dead)
    };
    let prefs = Preferences::in_memory();

    let err = directory(&api, &prefs)
        .fetch_stations(&FilterState::default())
        .await
        .unwrap_err();

    let FetchError::SearchFetchFailure { mirror, .. } = err;
    assert_eq!(mirror, Mirror::new(dead.to_string()));
    assert_eq!(prefs.load_mirror(), Some(mirror));
}

#[tokio::test]
async fn test_favorites_resolved_over_http() {
    let healthy = spawn_mirror().await;
    let api = api_config(healthy);
    let prefs = Preferences::in_memory();
    for id in ["fav-b", "missing", "broken", "fav-a"] {
        prefs.toggle_favorite(id).unwrap();
    }

    let mut filter = FilterState::default();
    filter.toggle_favorites_only();
    let stations = directory(&api, &prefs).fetch_stations(&filter).await.unwrap();

    let uuids: Vec<&str> = stations.iter().map(|s| s.uuid.as_str()).collect();
    assert_eq!(uuids, ["fav-b", "fav-a"]);
    assert_eq!(prefs.load_mirror(), Some(Mirror::new(healthy.to_string())));
}
