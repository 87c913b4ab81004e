// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response types for the API.

use ifc_clash_core::GroupEntry;
use ifc_clash_detect::{ComparisonMode, DetectionReport, GroupId, Progress};
use serde::Serialize;
use uuid::Uuid;

/// Returned when a session is opened.
#[derive(Debug, Clone, Serialize)]
pub struct SessionCreated {
    pub id: Uuid,
}

/// One group as the group panel shows it.
#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    /// Distinct elements in the group.
    pub count: usize,
    /// Names in the order they were added.
    pub entries: Vec<GroupEntry>,
    /// Categories that can still be added.
    pub available_categories: Vec<String>,
}

/// Full state of one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub group_a: GroupView,
    pub group_b: GroupView,
    pub progress: Progress,
    /// Collisions kept from the last completed run.
    pub result_count: usize,
}

/// Outcome of adding to a group.
#[derive(Debug, Clone, Serialize)]
pub struct AddResponse {
    pub group: GroupId,
    /// Elements the add covered, including ones already in the group.
    pub added: usize,
    /// User-facing status line.
    pub status: String,
    /// Group size after the add.
    pub group_count: usize,
}

/// Outcome of replacing the interactive selection.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionResponse {
    pub selected: usize,
    /// `model-item` ids that were not valid item ids.
    pub skipped: Vec<String>,
}

/// One loaded model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub model_id: String,
    pub element_count: usize,
    pub categories: Vec<String>,
}

/// Result of a blocking run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub status: String,
    /// How long the viewer should keep `status` visible.
    pub status_hold_ms: u64,
    pub report: DetectionReport,
}

/// Server-Sent Event types for streaming runs.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Run accepted.
    Start { mode: ComparisonMode },

    /// Latest progress snapshot; intermediate snapshots may be skipped.
    Progress {
        #[serde(flatten)]
        progress: Progress,
        percent: u8,
    },

    /// Run finished with a report.
    Complete {
        status: String,
        status_hold_ms: u64,
        report: DetectionReport,
    },

    /// Run was cancelled before it finished.
    Cancelled { status_hold_ms: u64 },

    /// Error occurred.
    Error { message: String },
}

impl StreamEvent {
    pub fn progress(progress: Progress) -> Self {
        let percent = progress.percent();
        StreamEvent::Progress { progress, percent }
    }

    /// SSE event name; matches the `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::Start { .. } => "start",
            StreamEvent::Progress { .. } => "progress",
            StreamEvent::Complete { .. } => "complete",
            StreamEvent::Cancelled { .. } => "cancelled",
            StreamEvent::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_clash_detect::Phase;

    #[test]
    fn progress_event_is_flat_and_tagged() {
        let event = StreamEvent::progress(Progress {
            phase: Phase::Comparing,
            processed: 1,
            total: 4,
            status: "Comparing items...".into(),
        });
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "progress");
        assert_eq!(json["phase"], "comparing");
        assert_eq!(json["processed"], 1);
        assert_eq!(json["percent"], 25);
    }

    #[test]
    fn cancelled_event_serializes() {
        let json = serde_json::to_string(&StreamEvent::Cancelled { status_hold_ms: 2000 }).unwrap();
        assert_eq!(json, r#"{"type":"cancelled","status_hold_ms":2000}"#);
    }
}
