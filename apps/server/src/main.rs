// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Clash Server - Clash detection sessions over HTTP.
//!
//! The viewer uploads each loaded model's elements with their category and
//! geometry, then drives detection sessions. It supports:
//!
//! - Building groups A and B from the interactive selection or by category
//! - Blocking runs that return the full report
//! - Streaming runs with Server-Sent Events progress and cancellation
//! - Isolation, highlight and camera data for each collision
//!
//! # Endpoints
//!
//! - `GET /api/v1/health` - Health check
//! - `POST /api/v1/models` - Load a model (JSON)
//! - `GET /api/v1/categories` - Categories across loaded models
//! - `POST /api/v1/sessions` - Open a session
//! - `POST /api/v1/sessions/:id/groups/:group/category` - Add a category to a group
//! - `POST /api/v1/sessions/:id/run/stream` - Streaming run (SSE)
//! - `GET /api/v1/sessions/:id/results/:index/focus` - Focus one collision
//!
//! `GET /` lists every endpoint.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod config;
mod error;
mod routes;
mod services;
mod types;

use config::Config;
use services::{SceneStore, SessionStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub scene: Arc<SceneStore>,
    pub sessions: Arc<SessionStore>,
    pub config: Arc<Config>,
}

fn router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    Router::new()
        // Root endpoint - API information
        .route("/", get(routes::health::info))
        // Health check
        .route("/api/v1/health", get(routes::health::check))
        // Models
        .route(
            "/api/v1/models",
            post(routes::models::load_model).get(routes::models::list_models),
        )
        .route("/api/v1/models/:model_id", delete(routes::models::unload_model))
        .route("/api/v1/categories", get(routes::models::list_categories))
        // Sessions
        .route("/api/v1/sessions", post(routes::sessions::open_session))
        .route(
            "/api/v1/sessions/:id",
            get(routes::sessions::get_session).delete(routes::sessions::close_session),
        )
        .route("/api/v1/sessions/:id/selection", put(routes::sessions::set_selection))
        .route(
            "/api/v1/sessions/:id/groups/:group",
            delete(routes::sessions::clear_group),
        )
        .route(
            "/api/v1/sessions/:id/groups/:group/selection",
            post(routes::sessions::add_selection),
        )
        .route(
            "/api/v1/sessions/:id/groups/:group/category",
            post(routes::sessions::add_category),
        )
        // Runs
        .route("/api/v1/sessions/:id/run", post(routes::sessions::run))
        .route("/api/v1/sessions/:id/run/stream", post(routes::sessions::run_stream))
        .route("/api/v1/sessions/:id/cancel", post(routes::sessions::cancel))
        .route("/api/v1/sessions/:id/progress", get(routes::sessions::progress))
        // Results
        .route("/api/v1/sessions/:id/results", get(routes::sessions::results))
        .route(
            "/api/v1/sessions/:id/results/:index/focus",
            get(routes::sessions::focus),
        )
        // Middleware, innermost first
        .layer(DefaultBodyLimit::max(config.max_body_mb * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,tower_http=debug,ifc_clash_server=debug".into()),
        )
        .pretty()
        .init();

    let config = Config::from_env();

    tracing::info!(
        port = config.port,
        max_body_mb = config.max_body_mb,
        request_timeout_secs = config.request_timeout_secs,
        resolve_yield_every = config.detect.resolve_yield_every,
        symmetric_report_every = config.detect.symmetric_report_every,
        cross_report_every = config.detect.cross_report_every,
        "Starting IFC-Clash Server"
    );

    let state = AppState {
        scene: Arc::new(SceneStore::new()),
        sessions: Arc::new(SessionStore::new()),
        config: Arc::new(config.clone()),
    };

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
