// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session endpoints: group building, runs and results.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::StreamExt;
use ifc_clash_core::CollisionPair;
use ifc_clash_detect::{AddOutcome, ClashDetector, ComparisonMode, GroupId, PairFocus, Progress};
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::{run_streaming, SceneStore};
use crate::types::{
    AddResponse, CategoryRequest, GroupView, RunRequest, RunResponse, SelectionRequest,
    SelectionResponse, SessionCreated, SessionResponse, StreamEvent,
};
use crate::AppState;

fn parse_group(raw: &str) -> Result<GroupId, ApiError> {
    raw.parse().map_err(ApiError::InvalidRequest)
}

fn parse_mode(body: &[u8]) -> Result<ComparisonMode, ApiError> {
    RunRequest::from_body(body)
        .map(|request| request.mode)
        .map_err(|e| ApiError::InvalidRequest(format!("run options: {e}")))
}

fn group_view(detector: &ClashDetector, id: GroupId, scene: &SceneStore) -> GroupView {
    let group = detector.group(id);
    GroupView {
        count: group.len(),
        entries: group.entries().to_vec(),
        available_categories: detector.available_categories(id, scene),
    }
}

fn add_response(detector: &ClashDetector, group: GroupId, outcome: AddOutcome) -> AddResponse {
    AddResponse {
        group,
        added: outcome.count(),
        status: outcome.to_string(),
        group_count: detector.group(group).len(),
    }
}

/// POST /api/v1/sessions - Open a session.
pub async fn open_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let handle = state.sessions.open(state.config.detect.clone());
    (StatusCode::CREATED, Json(SessionCreated { id: handle.id() }))
}

/// GET /api/v1/sessions/:id - Groups, progress and result count.
///
/// Busy while a run holds the session; poll `/progress` instead.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = state.sessions.get(id)?;
    let detector = handle.lock()?;
    Ok(Json(SessionResponse {
        id,
        group_a: group_view(&detector, GroupId::A, &state.scene),
        group_b: group_view(&detector, GroupId::B, &state.scene),
        progress: handle.progress(),
        result_count: detector.results().len(),
    }))
}

/// DELETE /api/v1/sessions/:id - Close a session, cancelling its run.
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.close(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/selection - Replace the interactive selection.
pub async fn set_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<SelectionResponse>, ApiError> {
    let handle = state.sessions.get(id)?;
    let (elements, skipped) = request.into_elements();
    let selected = elements.len();
    handle.with_selection(|selection| selection.replace(elements));
    tracing::debug!(session = %id, selected, skipped = skipped.len(), "Selection replaced");
    Ok(Json(SelectionResponse { selected, skipped }))
}

/// POST /api/v1/sessions/:id/groups/:group/selection - Add the selection to a group.
pub async fn add_selection(
    State(state): State<AppState>,
    Path((id, group)): Path<(Uuid, String)>,
) -> Result<Json<AddResponse>, ApiError> {
    let group = parse_group(&group)?;
    let handle = state.sessions.get(id)?;
    let mut detector = handle.lock()?;
    let outcome = handle.with_selection(|selection| detector.add_selection(group, selection));
    Ok(Json(add_response(&detector, group, outcome)))
}

/// POST /api/v1/sessions/:id/groups/:group/category - Add a category to a group.
pub async fn add_category(
    State(state): State<AppState>,
    Path((id, group)): Path<(Uuid, String)>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<AddResponse>, ApiError> {
    let group = parse_group(&group)?;
    let handle = state.sessions.get(id)?;
    let mut detector = handle.lock()?;
    let outcome = detector.add_category(group, state.scene.as_ref(), &request.category);
    Ok(Json(add_response(&detector, group, outcome)))
}

/// DELETE /api/v1/sessions/:id/groups/:group - Clear a group.
pub async fn clear_group(
    State(state): State<AppState>,
    Path((id, group)): Path<(Uuid, String)>,
) -> Result<Json<GroupView>, ApiError> {
    let group = parse_group(&group)?;
    let handle = state.sessions.get(id)?;
    let mut detector = handle.lock()?;
    detector.clear(group);
    Ok(Json(group_view(&detector, group, &state.scene)))
}

/// POST /api/v1/sessions/:id/run - Run detection and return the report.
///
/// The body is an optional [`RunRequest`]; an empty body compares A with B.
pub async fn run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<RunResponse>, ApiError> {
    let mode = parse_mode(&body)?;
    let handle = state.sessions.get(id)?;
    let mut detector = handle.lock()?;
    let cancel = handle.begin_run();

    let report = detector.run(state.scene.as_ref(), mode, &cancel).await?;
    Ok(Json(RunResponse {
        status: report.status.to_string(),
        status_hold_ms: detector.config().status_hold.as_millis() as u64,
        report,
    }))
}

/// POST /api/v1/sessions/:id/run/stream - Run detection, streaming progress.
///
/// Disconnecting cancels the run.
pub async fn run_stream(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let mode = parse_mode(&body)?;
    let handle = state.sessions.get(id)?;
    let detector = handle.lock()?;
    let cancel = handle.begin_run();

    let stream = run_streaming(detector, Arc::clone(&state.scene), mode, cancel).map(
        |event: StreamEvent| {
            let json = serde_json::to_string(&event).unwrap_or_else(|e| {
                serde_json::json!({ "type": "error", "message": e.to_string() }).to_string()
            });
            Ok(Event::default().event(event.name()).data(json))
        },
    );

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// POST /api/v1/sessions/:id/cancel - Cancel the running detection.
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.get(id)?.cancel();
    tracing::info!(session = %id, "Cancel requested");
    Ok(StatusCode::ACCEPTED)
}

/// GET /api/v1/sessions/:id/progress - Latest progress snapshot.
pub async fn progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Progress>, ApiError> {
    Ok(Json(state.sessions.get(id)?.progress()))
}

/// GET /api/v1/sessions/:id/results - Collisions from the last run.
pub async fn results(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CollisionPair>>, ApiError> {
    let handle = state.sessions.get(id)?;
    let detector = handle.lock()?;
    Ok(Json(detector.results().to_vec()))
}

/// GET /api/v1/sessions/:id/results/:index/focus - Viewer focus for one collision.
pub async fn focus(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<PairFocus>, ApiError> {
    let handle = state.sessions.get(id)?;
    let detector = handle.lock()?;
    detector
        .focus(index)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("result {index}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::SessionStore;
    use crate::types::ModelDocument;
    use ifc_clash_detect::RunStatus;

    fn state() -> AppState {
        let scene = SceneStore::new();
        let document: ModelDocument = serde_json::from_str(
            r#"{
                "model_id": "m1",
                "elements": [
                    {"id": 1, "category": "IFCWALL",
                     "geometry": {"box": {"min": [0, 0, 0], "max": [1, 1, 1]}}},
                    {"id": 2, "category": "IFCWALL",
                     "geometry": {"box": {"min": [5, 5, 5], "max": [6, 6, 6]}}},
                    {"id": 3, "category": "IFCBEAM",
                     "geometry": {"box": {"min": [0.5, 0.5, 0.5], "max": [2, 2, 2]}}}
                ]
            }"#,
        )
        .unwrap();
        scene.load(document);
        AppState {
            scene: Arc::new(scene),
            sessions: Arc::new(SessionStore::new()),
            config: Arc::new(Config::default()),
        }
    }

    async fn open(state: &AppState) -> Uuid {
        let (status, Json(created)) = open_session(State(state.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        created.id
    }

    fn category(name: &str) -> Json<CategoryRequest> {
        Json(CategoryRequest {
            category: name.to_string(),
        })
    }

    #[tokio::test]
    async fn build_groups_run_and_focus() {
        let state = state();
        let id = open(&state).await;

        let Json(added) = add_category(
            State(state.clone()),
            Path((id, "a".to_string())),
            category("IFCWALL"),
        )
        .await
        .unwrap();
        assert_eq!(added.status, "Added 2 items from IFCWALL.");
        assert_eq!(added.group_count, 2);

        add_category(State(state.clone()), Path((id, "B".to_string())), category("IFCBEAM"))
            .await
            .unwrap();

        let Json(session) = get_session(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(session.group_a.available_categories, vec!["IFCBEAM".to_string()]);
        assert_eq!(session.group_b.entries.len(), 1);

        let Json(response) = run(State(state.clone()), Path(id), Bytes::new()).await.unwrap();
        assert_eq!(response.report.status, RunStatus::Completed { collisions: 1 });
        assert_eq!(response.status, "1 collisions found.");

        let Json(focus) = focus(State(state.clone()), Path((id, 0))).await.unwrap();
        assert_eq!(focus.isolate.len(), 2);
        assert!(matches!(
            super::focus(State(state), Path((id, 1))).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn selection_flows_into_group() {
        let state = state();
        let id = open(&state).await;
        let request: SelectionRequest =
            serde_json::from_str(r#"{"selection": {"m1": ["1", 3, "x"]}}"#).unwrap();

        let Json(selected) = set_selection(State(state.clone()), Path(id), Json(request))
            .await
            .unwrap();
        assert_eq!(selected.selected, 2);
        assert_eq!(selected.skipped, vec!["m1-x".to_string()]);

        let Json(added) = add_selection(State(state.clone()), Path((id, "a".to_string())))
            .await
            .unwrap();
        assert_eq!(added.status, "Added 2 items from Selection.");

        let Json(again) = add_selection(State(state), Path((id, "a".to_string())))
            .await
            .unwrap();
        assert_eq!(again.status, "No items selected.");
        assert_eq!(again.group_count, 2);
    }

    #[tokio::test]
    async fn empty_groups_are_a_status_not_an_error() {
        let state = state();
        let id = open(&state).await;
        let Json(response) = run(State(state), Path(id), Bytes::new()).await.unwrap();
        assert_eq!(response.report.status, RunStatus::EmptyGroups);
        assert_eq!(response.status, "Please add items to both groups.");
    }

    #[tokio::test]
    async fn edits_are_rejected_while_the_session_is_held() {
        let state = state();
        let id = open(&state).await;
        let handle = state.sessions.get(id).unwrap();
        let _running = handle.lock().unwrap();

        let result = clear_group(State(state.clone()), Path((id, "a".to_string()))).await;
        assert!(matches!(result, Err(ApiError::SessionBusy)));

        let Json(progress) = progress(State(state), Path(id)).await.unwrap();
        assert_eq!(progress, Progress::default());
    }

    #[tokio::test]
    async fn unknown_group_and_session() {
        let state = state();
        let id = open(&state).await;
        assert!(matches!(
            clear_group(State(state.clone()), Path((id, "c".to_string()))).await,
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(matches!(
            cancel(State(state), Path(Uuid::new_v4())).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
