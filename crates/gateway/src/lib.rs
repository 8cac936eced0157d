//! HTTP and WebSocket server for realtychat.
//!
//! Routes:
//!
//! - `GET /health` — liveness plus the number of open connections
//! - `GET /ws`     — the chat relay; one WebSocket per browser session
//!
//! Built on Axum. Conversation logic lives in `realtychat-relay`; this crate
//! only moves frames between sockets and the relay.

pub mod ws;

use axum::{Router, extract::State, response::Json, routing::get};
use realtychat_core::error::ProviderError;
use realtychat_relay::{Relay, SessionStore};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub relay: Arc<Relay>,
    pub sessions: SessionStore,
}

impl GatewayState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay: Arc::new(relay),
            sessions: SessionStore::new(),
        }
    }
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// CORS is fully open: the browser client is served from a different origin.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: realtychat_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let router = realtychat_providers::router::build_from_config(&config);
    let provider = router
        .default()
        .ok_or_else(|| ProviderError::NotConfigured(config.default_provider.clone()))?;

    info!(
        provider = %provider.name(),
        model = %config.effective_model(),
        history_window = config.relay.history_window,
        "Relay configured"
    );

    let state = Arc::new(GatewayState::new(Relay::from_config(provider, &config)));
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    active_sessions: usize,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_sessions: state.sessions.len().await,
    })
}
