//! Documentation of a food package quality inspection service.
//!
//!
//!
//! # General Flow
//! - A station (browser dashboard or the `station` CLI) captures an image and reads temperature, weight and seal state
//! - Station posts the readings with its bearer token to `POST /api/inspections`
//! - Server validates the body, applies the verdict rule, stores the record
//! - Station refreshes the listing and statistics
//!
//!
//!
//! # Verdict
//!
//! See [`readings::verdict`]. A package passes only when temperature is within 0-25 °C, weight within
//! 100-1000 g and the package is sealed. Every failed check adds one sentence to the reason.
//!
//!
//!
//! # API
//!
//! | Method | Path | Auth | Result |
//! |--------|------|------|--------|
//! | `POST` | `/api/auth/register` | - | 201 session |
//! | `POST` | `/api/auth/login` | - | 200 session |
//! | `GET` | `/api/auth/me` | bearer | 200 profile |
//! | `POST` | `/api/inspections` | bearer | 201 record, 400 missing fields |
//! | `GET` | `/api/inspections` | - | 200, newest 100 records |
//! | `GET` | `/api/inspections/stats` | - | 200 counts |
//! | `DELETE` | `/api/inspections/{id}` | - | 200, 404 unknown id |
//!
//! Errors are `{"message": "..."}`. Anything else falls through to the static
//! frontend and unknown paths get its `index.html`.
//!
//!
//!
//! # Notes
//!
//! ## Image payloads
//! Images travel inline as base64 data URLs, so JSON bodies may be up to 50 MiB.
//!
//! ## Storage
//! Redis by default, see [`database`]. `REDIS_URL=memory://` keeps everything in process for local runs.
//!
//!
//!
//! # Setup
//!
//! Run against a local redis.
//! ```sh
//! JWT_SECRET=change-me REDIS_URL=redis://127.0.0.1:6379 cargo run -p inspect
//! ```
//!
//! Run without redis.
//! ```sh
//! JWT_SECRET=change-me REDIS_URL=memory:// cargo run -p inspect
//! ```
//!
//! Redis integration tests (needs docker).
//! ```sh
//! cargo test -p server --features integration-tests
//! ```
use std::{any::Any, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::json;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod memory;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

use auth::{login_handler, me_handler, register_handler};
use config::Config;
use routes::{
    api_root_handler, create_inspection_handler, delete_inspection_handler,
    inspection_stats_handler, list_inspections_handler,
};
use state::AppState;

/// Largest accepted request body.
pub const BODY_LIMIT: usize = 50 * 1024 * 1024;

pub async fn start_server() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("server=info,tower_http=info")),
        )
        .init();

    info!("Loading configuration...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    info!("Starting server...");
    let app = build_router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();
    let frontend =
        ServeDir::new(&static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin)
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api", get(api_root_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/me", get(me_handler))
        .route(
            "/api/inspections",
            post(create_inspection_handler).get(list_inspections_handler),
        )
        .route("/api/inspections/stats", get(inspection_stats_handler))
        .route("/api/inspections/{id}", delete(delete_inspection_handler))
        .fallback_service(frontend)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "Something went wrong!" })),
    )
        .into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
