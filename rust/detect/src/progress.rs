// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Progress publication and cooperative cancellation.
//!
//! A run publishes `(processed, total, status)` snapshots on a
//! [`tokio::sync::watch`] channel. Subscribers always see the latest snapshot;
//! intermediate ones may be skipped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Stage of a detection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    #[default]
    Idle,
    ResolvingGroupA,
    ResolvingGroupB,
    Comparing,
    Finished,
}

/// One progress snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Progress {
    pub phase: Phase,
    pub processed: u64,
    pub total: u64,
    pub status: String,
}

impl Progress {
    /// Completion of the current phase, rounded to whole percent.
    ///
    /// A phase with nothing to do counts as complete.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let ratio = self.processed.min(self.total) as f64 / self.total as f64;
        (ratio * 100.0).round() as u8
    }
}

/// Publishes progress for one detector session.
#[derive(Debug)]
pub struct ProgressReporter {
    tx: watch::Sender<Progress>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Progress::default());
        Self { tx }
    }

    /// A receiver that observes every snapshot published from now on.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.tx.subscribe()
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> Progress {
        self.tx.borrow().clone()
    }

    /// Starts a phase with `total` units of work and a status line.
    pub fn begin(&self, phase: Phase, total: u64, status: impl Into<String>) {
        let status = status.into();
        tracing::info!(?phase, total, status = %status, "Detection phase");
        self.tx.send_replace(Progress {
            phase,
            processed: 0,
            total,
            status,
        });
    }

    /// Records how many units of the current phase are done.
    pub fn advance(&self, processed: u64) {
        self.tx.send_modify(|progress| progress.processed = processed);
    }

    /// Ends the run with a terminal status line; counts are kept.
    pub fn finish(&self, status: impl Into<String>) {
        let status = status.into();
        tracing::info!(status = %status, "Detection finished");
        self.tx.send_modify(|progress| {
            progress.phase = Phase::Finished;
            progress.status = status;
        });
    }

    /// Back to idle with an empty status, as a host does once the terminal
    /// status has been shown.
    pub fn reset(&self) {
        self.tx.send_replace(Progress::default());
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancels an in-flight run at its next yield point.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Hands control back to the runtime, then honours a pending cancel.
pub(crate) async fn checkpoint(cancel: &CancelToken) -> Result<()> {
    tokio::task::yield_now().await;
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds() {
        let progress = Progress {
            processed: 1,
            total: 3,
            ..Progress::default()
        };
        assert_eq!(progress.percent(), 33);

        let progress = Progress {
            processed: 2,
            total: 3,
            ..Progress::default()
        };
        assert_eq!(progress.percent(), 67);
    }

    #[test]
    fn empty_phase_is_complete() {
        assert_eq!(Progress::default().percent(), 100);
    }

    #[test]
    fn reporter_publishes_to_subscribers() {
        let reporter = ProgressReporter::new();
        let mut rx = reporter.subscribe();

        reporter.begin(Phase::Comparing, 10, "Comparing items...");
        reporter.advance(4);
        assert!(rx.has_changed().unwrap());

        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.phase, Phase::Comparing);
        assert_eq!(seen.processed, 4);
        assert_eq!(seen.total, 10);
        assert_eq!(seen.status, "Comparing items...");

        reporter.finish("No collisions found.");
        let done = reporter.snapshot();
        assert_eq!(done.phase, Phase::Finished);
        assert_eq!(done.processed, 4);
    }

    #[test]
    fn reporter_works_without_subscribers() {
        let reporter = ProgressReporter::new();
        reporter.begin(Phase::ResolvingGroupA, 5, "Getting bounding boxes for Group A...");
        reporter.advance(5);
        assert_eq!(reporter.snapshot().percent(), 100);

        reporter.reset();
        assert_eq!(reporter.snapshot(), Progress::default());
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn checkpoint_reports_cancel() {
        let token = CancelToken::new();
        assert!(checkpoint(&token).await.is_ok());
        token.cancel();
        assert!(matches!(checkpoint(&token).await, Err(Error::Cancelled)));
    }
}
