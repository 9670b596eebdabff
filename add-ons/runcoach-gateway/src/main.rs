//! Axum-based API gateway for the running coach. Config-driven via CoachConfig.
//! Chat is wired through handlers::chat; plan cards export as .ics through
//! handlers::calendar.

mod handlers;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use runcoach_core::{CoachConfig, CoachOrchestrator, GeminiBridge, InMemorySessionStore};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Shared handler state: the orchestrator is absent when no API key is
/// configured, and chat requests then answer with a Korean 400.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Option<Arc<CoachOrchestrator>>,
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/chat", post(handlers::chat::handle))
        .route("/api/ical", post(handlers::calendar::handle))
        .layer(CatchPanicLayer::custom(handlers::chat::panic_response))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runcoach_gateway=info,runcoach_core=info".into()),
        )
        .init();

    let config = CoachConfig::from_env();

    let orchestrator = match GeminiBridge::from_config(&config) {
        Ok(bridge) => {
            let store = Arc::new(InMemorySessionStore::new());
            Some(Arc::new(CoachOrchestrator::new(store, Arc::new(bridge))))
        }
        Err(e) => {
            warn!(error = %e, "starting without a Gemini bridge; /api/chat will reject requests");
            None
        }
    };

    let state = AppState { orchestrator };
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("cannot bind {}: {e}", config.bind_addr));
    info!(addr = %config.bind_addr, model = %config.model, "runcoach gateway listening");

    axum::serve(listener, app(state))
        .await
        .expect("gateway server");
}
