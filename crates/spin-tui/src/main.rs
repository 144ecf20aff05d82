mod action;
mod app;
mod app_state;
mod audio;
mod component;
mod components;
mod mpv;
mod session;
mod theme;
mod timer;
mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use spin_core::catalog::Catalog;
use spin_core::config::Config;
use tokio::sync::mpsc;

use crate::action::Route;
use crate::app_state::AppState;
use crate::audio::{AudioEngine, AudioHandle, AudioNotice};

#[derive(Parser, Debug)]
#[command(name = "spin")]
#[command(about = "Terminal media player with a track catalog, mini player and full-page player")]
struct Args {
    /// Open the full-page player for this track id.
    #[arg(long, value_name = "ID")]
    media: Option<u32>,

    /// TOML track list to use instead of the configured one.
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Config file to use instead of ~/.config/spin/config.toml.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // ── Load config ──────────────────────────────────────────────────────────
    let config_path = args.config.clone().unwrap_or_else(Config::config_path);
    let config = Config::load_from(&config_path).unwrap_or_else(|e| {
        eprintln!("spin: config {}: {} (using defaults)", config_path.display(), e);
        Config::default()
    });

    // ── Logging ──────────────────────────────────────────────────────────────
    let data_dir = spin_core::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("spin.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override of the configured filter.
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log.filter.clone());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("spin log: {}", log_path.display());
    tracing::info!("spin starting…");

    // ── Catalog ──────────────────────────────────────────────────────────────
    let catalog_path = args
        .catalog
        .clone()
        .unwrap_or_else(|| config.catalog.catalog_toml.clone());
    let catalog = Catalog::load_or_builtin(&catalog_path);

    // ── Audio engine ─────────────────────────────────────────────────────────
    let (notice_tx, notice_rx) = mpsc::channel::<AudioNotice>(64);
    let (audio, cmd_rx) = AudioHandle::channel(256);
    let engine = AudioEngine::new(config.audio.clone(), notice_tx);
    let engine_task = tokio::spawn(async move {
        if let Err(e) = engine.run(cmd_rx).await {
            tracing::error!("audio engine exited with error: {}", e);
        }
    });

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let route = args.media.map_or(Route::Index, Route::Media);
    let state = AppState::new(catalog, route, config.ui.show_keys_bar);
    let result = app::App::new(state, audio).run(notice_rx).await;

    // Every AudioHandle is gone with the App; the engine drains and kills mpv.
    if tokio::time::timeout(Duration::from_secs(3), engine_task)
        .await
        .is_err()
    {
        tracing::warn!("audio engine did not stop in time");
    }

    result
}
