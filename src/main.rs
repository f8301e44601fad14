mod api;
mod config;
mod db;
mod dom;
mod error;
mod feed;
mod notify;
mod parse;
mod scanner;
mod stats;
mod types;

use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::api::routes::{router, ApiState};
use crate::config::{Config, CHANNEL_CAPACITY};
use crate::db::{load_settings, KeyValueStore, SqliteStore};
use crate::error::Result;
use crate::feed::BridgeServer;
use crate::scanner::ScanEngine;
use crate::stats::StatsStore;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Persistence setup ---
    let options = SqliteConnectOptions::new()
        .filename(&cfg.db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    let store = Arc::new(SqliteStore::new(pool).await?);
    let kv: Arc<dyn KeyValueStore> = store.clone();
    info!("database ready at {}", cfg.db_path);

    // --- Settings (fixed for this process; the API writes for next start) ---
    let settings = load_settings(kv.as_ref()).await;
    info!(
        min_amount = ?settings.min_amount,
        max_amount = ?settings.max_amount,
        currency = ?settings.currency,
        max_price = ?settings.max_price,
        pages_to_check = settings.pages_to_check,
        "settings loaded"
    );
    if !settings.has_amount_range() {
        info!("amount range incomplete — the amount pass is disabled until settings are saved and the process restarts");
    }

    // --- Analytics store (staleness resets applied on load) ---
    let stats = StatsStore::load(Arc::clone(&kv)).await;
    info!(
        price_history = stats.price_history().len(),
        average_entries = stats.average_log().len(),
        matched_entries = stats.matched_offers().len(),
        "analytics loaded"
    );

    let health = Arc::new(HealthState::new());
    let latency = Arc::new(LatencyStats::new());

    // --- Channels ---
    let (feed_tx, feed_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (command_tx, command_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (notify_tx, notify_rx) = mpsc::channel(CHANNEL_CAPACITY);

    // --- Spawn tasks ---

    // Bridge server: browser feed in, edit/notify commands out.
    let bridge = BridgeServer::new(
        cfg.bridge_addr.clone(),
        settings.pages_to_check,
        feed_tx,
        command_rx,
        Arc::clone(&health),
    );
    tokio::spawn(async move { bridge.run().await });

    // Notification consumer.
    tokio::spawn(notify::run_notifier(notify_rx, command_tx.clone()));

    // Scan engine (hot path): owns the mirror and the analytics store.
    let engine = ScanEngine::new(
        settings,
        stats,
        feed_rx,
        command_tx,
        notify_tx,
        Arc::clone(&latency),
        Arc::clone(&health),
    );
    tokio::spawn(async move { engine.run().await });

    // --- HTTP API ---
    let api_state = ApiState {
        store: kv,
        latency,
        health,
    };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
