// =============================================================================
// Meridian Market Desk — Main Entry Point
// =============================================================================
//
// Serves historical chart data with computed technical indicators, a live
// market snapshot, and a language-model chat proxy to the dashboard front
// end. All collaborator clients are constructed once here and shared through
// AppState; credentials come from the environment, never from code.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod chart;
mod chat;
mod indicators;
mod market_data;
mod runtime_config;
mod store;
mod types;

use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::chat::ChatClient;
use crate::market_data::QuoteClient;
use crate::runtime_config::RuntimeConfig;
use crate::store::BarStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Meridian Market Desk — Starting Up               ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let mut config = RuntimeConfig::load("runtime_config.json").unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // Env overrides for deployment knobs.
    if let Ok(addr) = std::env::var("MERIDIAN_BIND_ADDR") {
        config.bind_addr = addr;
    }
    if let Ok(dir) = std::env::var("MERIDIAN_DATA_DIR") {
        config.data_dir = dir;
    }

    info!(
        bind_addr = %config.bind_addr,
        data_dir = %config.data_dir,
        basket = config.basket.len(),
        "Desk configured"
    );

    // ── 2. Historical bar store ──────────────────────────────────────────
    let bar_store = match BarStore::load_dir(&config.data_dir) {
        Ok(store) => store,
        Err(e) => {
            warn!(dir = %config.data_dir, error = %e, "Bar data directory unreadable — starting with an empty store");
            BarStore::default()
        }
    };

    // ── 3. Collaborator clients (constructed once, shared by handle) ─────
    let quotes = QuoteClient::new(config.quote_range.clone());

    let chat = match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => {
            info!(model = %config.chat_model, "Chat proxy enabled");
            Some(ChatClient::new(key, config.chat_model.clone()))
        }
        _ => {
            warn!("OPENAI_API_KEY not set — chat endpoint disabled");
            None
        }
    };

    // ── 4. Shared state & API server ─────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, bar_store, quotes, chat));

    let api_state = state.clone();
    let bind_addr_clone = bind_addr.clone();
    tokio::spawn(async move {
        let app = api::rest::router(api_state);
        let listener = tokio::net::TcpListener::bind(&bind_addr_clone)
            .await
            .expect("Failed to bind API server");
        info!(addr = %bind_addr_clone, "API server listening");
        axum::serve(listener, app)
            .await
            .expect("API server failed");
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");

    if let Err(e) = state.runtime_config.read().save("runtime_config.json") {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("Meridian Market Desk shut down complete.");
    Ok(())
}
