// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model upload endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use ifc_clash_core::CategoryProvider;

use crate::error::ApiError;
use crate::types::{ModelDocument, ModelSummary};
use crate::AppState;

/// POST /api/v1/models - Load or replace a model.
pub async fn load_model(
    State(state): State<AppState>,
    Json(document): Json<ModelDocument>,
) -> Result<(StatusCode, Json<ModelSummary>), ApiError> {
    if document.model_id.trim().is_empty() {
        return Err(ApiError::InvalidRequest("model_id must not be empty".into()));
    }
    Ok((StatusCode::CREATED, Json(state.scene.load(document))))
}

/// GET /api/v1/models - List loaded models.
pub async fn list_models(State(state): State<AppState>) -> Json<Vec<ModelSummary>> {
    Json(state.scene.list())
}

/// DELETE /api/v1/models/:model_id - Unload a model.
pub async fn unload_model(
    State(state): State<AppState>,
    Path(model_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.scene.unload(&model_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("model {model_id}")))
    }
}

/// GET /api/v1/categories - Distinct categories across loaded models.
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.scene.categories())
}
