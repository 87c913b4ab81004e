// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
    pub models: usize,
    pub sessions: usize,
}

/// API information response.
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<EndpointInfo>,
}

/// Endpoint information.
#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

const fn endpoint(method: &'static str, path: &'static str, description: &'static str) -> EndpointInfo {
    EndpointInfo {
        method,
        path,
        description,
    }
}

/// GET /api/v1/health - Health check endpoint.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: "ifc-clash-server",
        models: state.scene.list().len(),
        sessions: state.sessions.len(),
    })
}

/// GET / - API information endpoint.
pub async fn info() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        service: "ifc-clash-server",
        version: env!("CARGO_PKG_VERSION"),
        description: "Bounding-box clash detection between groups of BIM elements",
        endpoints: vec![
            endpoint("GET", "/api/v1/health", "Health check endpoint"),
            endpoint("POST", "/api/v1/models", "Load a model's elements and geometry"),
            endpoint("GET", "/api/v1/models", "List loaded models"),
            endpoint("DELETE", "/api/v1/models/:model_id", "Unload a model"),
            endpoint("GET", "/api/v1/categories", "Categories across loaded models"),
            endpoint("POST", "/api/v1/sessions", "Open a detection session"),
            endpoint("GET", "/api/v1/sessions/:id", "Groups, progress and result count"),
            endpoint("DELETE", "/api/v1/sessions/:id", "Close a session"),
            endpoint("PUT", "/api/v1/sessions/:id/selection", "Replace the interactive selection"),
            endpoint(
                "POST",
                "/api/v1/sessions/:id/groups/:group/selection",
                "Add the selection to group a or b",
            ),
            endpoint(
                "POST",
                "/api/v1/sessions/:id/groups/:group/category",
                "Add a category to group a or b",
            ),
            endpoint("DELETE", "/api/v1/sessions/:id/groups/:group", "Clear a group"),
            endpoint("POST", "/api/v1/sessions/:id/run", "Run detection and return the report"),
            endpoint(
                "POST",
                "/api/v1/sessions/:id/run/stream",
                "Run detection with progress (Server-Sent Events)",
            ),
            endpoint("POST", "/api/v1/sessions/:id/cancel", "Cancel the running detection"),
            endpoint("GET", "/api/v1/sessions/:id/progress", "Latest progress snapshot"),
            endpoint("GET", "/api/v1/sessions/:id/results", "Collisions from the last run"),
            endpoint(
                "GET",
                "/api/v1/sessions/:id/results/:index/focus",
                "Isolation, highlight and camera data for one collision",
            ),
        ],
    })
}
