// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Detection runs streamed as Server-Sent Events.
//!
//! The run executes on its own task while the stream forwards progress
//! snapshots from the session's watch channel. Dropping the stream (client
//! disconnect) cancels the run, which then releases the session.

use std::pin::Pin;
use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use ifc_clash_detect::{CancelToken, ClashDetector, ComparisonMode, DetectionReport, Progress};
use tokio::sync::{watch, OwnedMutexGuard};
use tokio::task::JoinError;

use crate::services::scene::SceneStore;
use crate::types::StreamEvent;

/// Cancels the run when the event stream goes away.
struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

enum Step {
    Progress(Progress),
    Done(Result<ifc_clash_detect::Result<DetectionReport>, JoinError>),
}

/// Runs detection on a locked session and streams its progress.
///
/// Emits `start`, any number of `progress` events, then exactly one of
/// `complete`, `cancelled` or `error`.
pub fn run_streaming(
    mut detector: OwnedMutexGuard<ClashDetector>,
    scene: Arc<SceneStore>,
    mode: ComparisonMode,
    cancel: CancelToken,
) -> Pin<Box<dyn Stream<Item = StreamEvent> + Send>> {
    let mut progress: watch::Receiver<Progress> = detector.subscribe();
    let status_hold_ms = detector.config().status_hold.as_millis() as u64;
    let guard = CancelOnDrop(cancel.clone());

    Box::pin(stream! {
        let _guard = guard;
        yield StreamEvent::Start { mode };

        let mut run = tokio::spawn(async move {
            detector.run(scene.as_ref(), mode, &cancel).await
        });

        loop {
            let step = tokio::select! {
                biased;
                changed = progress.changed() => match changed {
                    Ok(()) => Step::Progress(progress.borrow_and_update().clone()),
                    Err(_) => Step::Done((&mut run).await),
                },
                joined = &mut run => Step::Done(joined),
            };

            match step {
                Step::Progress(snapshot) => yield StreamEvent::progress(snapshot),
                Step::Done(Ok(Ok(report))) => {
                    yield StreamEvent::Complete {
                        status: report.status.to_string(),
                        status_hold_ms,
                        report,
                    };
                    break;
                }
                Step::Done(Ok(Err(ifc_clash_detect::Error::Cancelled))) => {
                    yield StreamEvent::Cancelled { status_hold_ms };
                    break;
                }
                Step::Done(Err(e)) => {
                    tracing::error!(error = %e, "Detection task failed");
                    yield StreamEvent::Error { message: e.to_string() };
                    break;
                }
            }
        }
    })
}
