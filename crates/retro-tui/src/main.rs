mod action;
mod app;
mod app_state;
mod component;
mod components;
mod mpv;
mod player;
mod theme;
mod widgets;

use std::sync::Arc;

use retro_core::config::Config;
use retro_core::directory::Directory;
use retro_core::prefs::{JsonFileStore, Preferences};
use retro_core::transport::HttpTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = retro_core::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("retro-radio.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG overrides; HTTP client internals are noisy at debug
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // The terminal belongs to the UI from here on
    eprintln!("retro-radio log: {}", log_path.display());

    tracing::info!("retro-radio starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("config: {}, using defaults", e);
            Config::default()
        }
    };

    // ── Preferences + directory ──────────────────────────────────────────────
    let store = JsonFileStore::open(config.paths.prefs_file.clone());
    tracing::info!("[prefs] using {}", store.path().display());
    let prefs = Preferences::new(Arc::new(store)).with_default_volume(config.player.default_volume);
    let transport = HttpTransport::new(&config.api)?;
    let directory = Arc::new(Directory::new(
        Arc::new(transport),
        prefs.clone(),
        &config.api,
    ));

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(config, prefs, directory);
    app.run().await?;

    Ok(())
}
