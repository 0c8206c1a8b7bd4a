mod config;
pub mod dispatch;
pub mod messages;
pub mod relay;
pub mod rooms;
mod state;
mod ws;

pub use config::Config;
pub use state::RelayState;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade, ws::WebSocket},
    http::Method,
    response::Response,
    routing::get,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

async fn health() -> &'static str {
    "ok"
}

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayState>,
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    ws::run_connection(socket, state.relay).await;
}

pub fn app() -> Router {
    app_with_config(&Config::default())
}

pub fn app_with_config(config: &Config) -> Router {
    app_with_state(config, Arc::new(RelayState::new()))
}

/// Build the router around an existing relay state. Starts the idle sweep
/// when one is configured, so this must run inside a Tokio runtime.
pub fn app_with_state(config: &Config, relay: Arc<RelayState>) -> Router {
    if let Some(timeout) = config.room_idle_timeout {
        state::spawn_idle_sweep(relay.clone(), timeout);
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST]);

    let router = Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .with_state(AppState { relay });

    let router = match &config.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(cors)
}
