// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A clash detection session: two groups, a progress channel, and the
//! results of the last run.

use std::fmt;
use std::str::FromStr;

use ifc_clash_core::{
    CategoryProvider, CollisionPair, GeometryProvider, Group, SelectionProvider,
};
use tokio::sync::watch;

use crate::builder::{add_category_to_group, add_selection_to_group, clear_group, AddOutcome};
use crate::config::DetectConfig;
use crate::engine::{comparison_count, detect_collisions, ComparisonMode};
use crate::error::{Error, Result};
use crate::focus::PairFocus;
use crate::progress::{CancelToken, Phase, Progress, ProgressReporter};
use crate::resolver::resolve_boxes;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const STATUS_RESOLVING_A: &str = "Getting bounding boxes for Group A...";
const STATUS_RESOLVING_B: &str = "Getting bounding boxes for Group B...";
const STATUS_COMPARING: &str = "Comparing items...";
const STATUS_CANCELLED: &str = "Detection cancelled.";

/// Marks the run cancelled if its future is dropped before the scan returns.
struct FinishOnDrop<'a> {
    reporter: &'a ProgressReporter,
    armed: bool,
}

impl<'a> FinishOnDrop<'a> {
    fn new(reporter: &'a ProgressReporter) -> Self {
        Self {
            reporter,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for FinishOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::info!("Detection dropped before it finished");
            self.reporter.finish(STATUS_CANCELLED);
        }
    }
}

/// Names one of the session's two groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GroupId {
    A,
    B,
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupId::A => f.write_str("A"),
            GroupId::B => f.write_str("B"),
        }
    }
}

impl FromStr for GroupId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "a" | "A" => Ok(GroupId::A),
            "b" | "B" => Ok(GroupId::B),
            other => Err(format!("unknown group: {other}")),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum RunStatus {
    /// The scan ran to the end.
    Completed { collisions: usize },
    /// A group the mode needs had no elements; nothing was resolved.
    EmptyGroups,
    /// No element of a needed group had a usable box; nothing was compared.
    NoBoxes,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Completed { collisions: 0 } => f.write_str("No collisions found."),
            RunStatus::Completed { collisions } => write!(f, "{collisions} collisions found."),
            RunStatus::EmptyGroups => f.write_str("Please add items to both groups."),
            RunStatus::NoBoxes => f.write_str("Could not get bounding boxes for items."),
        }
    }
}

/// Outcome of one detection run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DetectionReport {
    pub mode: ComparisonMode,
    pub status: RunStatus,
    /// Collisions in discovery order.
    pub pairs: Vec<CollisionPair>,
    /// Elements of group A with a usable box.
    pub resolved_a: usize,
    /// Elements of group B with a usable box; equals `resolved_a` in
    /// symmetric mode.
    pub resolved_b: usize,
    pub comparisons: u64,
}

impl DetectionReport {
    fn aborted(mode: ComparisonMode, status: RunStatus, resolved_a: usize, resolved_b: usize) -> Self {
        Self {
            mode,
            status,
            pairs: Vec::new(),
            resolved_a,
            resolved_b,
            comparisons: 0,
        }
    }
}

/// One detection session.
///
/// [`ClashDetector::run`] takes `&mut self`, so a session can never have two
/// runs in flight, and groups cannot change under a running scan.
#[derive(Debug, Default)]
pub struct ClashDetector {
    config: DetectConfig,
    group_a: Group,
    group_b: Group,
    reporter: ProgressReporter,
    results: Vec<CollisionPair>,
}

impl ClashDetector {
    pub fn new(config: DetectConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DetectConfig {
        &self.config
    }

    pub fn group(&self, id: GroupId) -> &Group {
        match id {
            GroupId::A => &self.group_a,
            GroupId::B => &self.group_b,
        }
    }

    fn group_mut(&mut self, id: GroupId) -> &mut Group {
        match id {
            GroupId::A => &mut self.group_a,
            GroupId::B => &mut self.group_b,
        }
    }

    /// Adds the interactive selection to a group and clears the selection.
    pub fn add_selection<S>(&mut self, id: GroupId, selection: &mut S) -> AddOutcome
    where
        S: SelectionProvider + ?Sized,
    {
        let outcome = add_selection_to_group(selection, self.group_mut(id));
        tracing::info!(group = %id, outcome = %outcome, "Add selection");
        outcome
    }

    /// Adds every element of an exact category to a group.
    pub fn add_category<C>(&mut self, id: GroupId, provider: &C, category: &str) -> AddOutcome
    where
        C: CategoryProvider + ?Sized,
    {
        let outcome = add_category_to_group(provider, category, self.group_mut(id));
        tracing::info!(group = %id, outcome = %outcome, "Add category");
        outcome
    }

    pub fn clear(&mut self, id: GroupId) {
        clear_group(self.group_mut(id));
        tracing::info!(group = %id, "Cleared group");
    }

    /// Categories the provider knows that have not been added to `id` yet.
    pub fn available_categories<C>(&self, id: GroupId, provider: &C) -> Vec<String>
    where
        C: CategoryProvider + ?Sized,
    {
        let all = provider.categories();
        self.group(id)
            .available_categories(all.iter().map(String::as_str))
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Observe progress of current and future runs.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.reporter.subscribe()
    }

    pub fn progress(&self) -> Progress {
        self.reporter.snapshot()
    }

    /// Clears a terminal status once the host has shown it.
    pub fn dismiss_status(&self) {
        self.reporter.reset();
    }

    /// Collisions from the last completed run.
    pub fn results(&self) -> &[CollisionPair] {
        &self.results
    }

    /// Viewer focus data for result `index` of the last run.
    pub fn focus(&self, index: usize) -> Option<PairFocus> {
        self.results.get(index).map(PairFocus::from_pair)
    }

    /// Runs detection over the current groups.
    ///
    /// Group A is fully resolved before group B; comparison starts once both
    /// box lists are complete. In [`ComparisonMode::Symmetric`] group A is
    /// scanned against itself and group B is not consulted.
    ///
    /// Empty groups and groups without usable boxes end the run early with a
    /// status, not an error. Only a cancel through `cancel` returns an error;
    /// results of the previous run are cleared either way. Dropping the
    /// returned future mid-run leaves the session `Finished` with the
    /// cancelled status.
    pub async fn run<G>(
        &mut self,
        geometry: &G,
        mode: ComparisonMode,
        cancel: &CancelToken,
    ) -> Result<DetectionReport>
    where
        G: GeometryProvider + Sync + ?Sized,
    {
        self.results.clear();
        self.reporter.reset();

        let outcome = {
            let mut abandoned = FinishOnDrop::new(&self.reporter);
            let outcome = self.scan(geometry, mode, cancel).await;
            abandoned.disarm();
            outcome
        };

        let report = match outcome {
            Ok(report) => report,
            Err(Error::Cancelled) => {
                tracing::info!(%mode, "Detection cancelled");
                self.reporter.finish(STATUS_CANCELLED);
                return Err(Error::Cancelled);
            }
        };

        self.reporter.finish(report.status.to_string());
        self.results = report.pairs.clone();
        Ok(report)
    }

    async fn scan<G>(
        &self,
        geometry: &G,
        mode: ComparisonMode,
        cancel: &CancelToken,
    ) -> Result<DetectionReport>
    where
        G: GeometryProvider + Sync + ?Sized,
    {
        let needs_b = mode == ComparisonMode::Cross;
        if self.group_a.is_empty() || (needs_b && self.group_b.is_empty()) {
            tracing::info!(
                %mode,
                group_a = self.group_a.len(),
                group_b = self.group_b.len(),
                "Detection requested with an empty group"
            );
            return Ok(DetectionReport::aborted(mode, RunStatus::EmptyGroups, 0, 0));
        }

        let config = &self.config;
        let reporter = &self.reporter;

        reporter.begin(
            Phase::ResolvingGroupA,
            self.group_a.len() as u64,
            STATUS_RESOLVING_A,
        );
        let boxes_a = resolve_boxes(geometry, self.group_a.elements(), reporter, cancel, config).await?;

        let boxes_b = if needs_b {
            reporter.begin(
                Phase::ResolvingGroupB,
                self.group_b.len() as u64,
                STATUS_RESOLVING_B,
            );
            resolve_boxes(geometry, self.group_b.elements(), reporter, cancel, config).await?
        } else {
            Vec::new()
        };

        let resolved_a = boxes_a.len();
        let resolved_b = if needs_b { boxes_b.len() } else { resolved_a };
        if resolved_a == 0 || resolved_b == 0 {
            return Ok(DetectionReport::aborted(mode, RunStatus::NoBoxes, resolved_a, resolved_b));
        }

        let total = comparison_count(mode, resolved_a, resolved_b);
        reporter.begin(Phase::Comparing, total, STATUS_COMPARING);
        let pairs = detect_collisions(mode, &boxes_a, &boxes_b, reporter, cancel, config).await?;

        Ok(DetectionReport {
            mode,
            status: RunStatus::Completed {
                collisions: pairs.len(),
            },
            pairs,
            resolved_a,
            resolved_b,
            comparisons: total,
        })
    }
}
