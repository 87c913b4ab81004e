// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pairwise intersection scan.
//!
//! [`PairScan`] walks the comparison space in bounded chunks so a caller can
//! interleave progress reports and yields; [`detect_collisions`] is the
//! cooperative driver and [`find_collisions`] runs a scan to completion in
//! one go.

use std::fmt;
use std::str::FromStr;

use ifc_clash_core::{BoxedElement, CollisionPair, PairKey};
use rustc_hash::FxHashSet;

use crate::config::DetectConfig;
use crate::error::Result;
use crate::progress::{checkpoint, CancelToken, ProgressReporter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which comparison space a run covers. Chosen by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ComparisonMode {
    /// One group against itself: each unordered pair once.
    Symmetric,
    /// Every element of A against every element of B.
    #[default]
    Cross,
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonMode::Symmetric => f.write_str("symmetric"),
            ComparisonMode::Cross => f.write_str("cross"),
        }
    }
}

impl FromStr for ComparisonMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "symmetric" => Ok(ComparisonMode::Symmetric),
            "cross" => Ok(ComparisonMode::Cross),
            other => Err(format!("unknown comparison mode: {other}")),
        }
    }
}

/// Number of comparisons a scan performs: `n(n-1)/2` or `|A|·|B|`.
pub fn comparison_count(mode: ComparisonMode, a_len: usize, b_len: usize) -> u64 {
    let a = a_len as u64;
    match mode {
        ComparisonMode::Symmetric => a * a.saturating_sub(1) / 2,
        ComparisonMode::Cross => a * b_len as u64,
    }
}

/// Resumable pairwise scan over two box lists.
///
/// In [`ComparisonMode::Symmetric`] only `a` is scanned, over index pairs
/// `i < j`. In [`ComparisonMode::Cross`] an element present in both lists is
/// never paired with itself and a pair reached from both traversal paths is
/// reported once. Pairs come out in outer-then-inner loop order.
#[derive(Debug)]
pub struct PairScan<'a> {
    mode: ComparisonMode,
    a: &'a [BoxedElement],
    b: &'a [BoxedElement],
    i: usize,
    j: usize,
    comparisons: u64,
    total: u64,
    seen: FxHashSet<PairKey>,
}

impl<'a> PairScan<'a> {
    pub fn new(mode: ComparisonMode, a: &'a [BoxedElement], b: &'a [BoxedElement]) -> Self {
        let (b, j) = match mode {
            ComparisonMode::Symmetric => (a, 1),
            ComparisonMode::Cross => (b, 0),
        };
        Self {
            mode,
            a,
            b,
            i: 0,
            j,
            comparisons: 0,
            total: comparison_count(mode, a.len(), b.len()),
            seen: FxHashSet::default(),
        }
    }

    pub fn comparisons(&self) -> u64 {
        self.comparisons
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_finished(&self) -> bool {
        self.comparisons >= self.total
    }

    /// Performs up to `budget` comparisons, appending hits to `out`.
    ///
    /// Returns `true` once the whole space has been scanned.
    pub fn step(&mut self, budget: u64, out: &mut Vec<CollisionPair>) -> bool {
        let mut remaining = budget;
        while remaining > 0 {
            let Some((i, j)) = self.next_index() else {
                break;
            };
            self.compare(i, j, out);
            self.comparisons += 1;
            remaining -= 1;
        }
        self.is_finished()
    }

    fn next_index(&mut self) -> Option<(usize, usize)> {
        let (a_len, b_len) = (self.a.len(), self.b.len());
        while self.i < a_len {
            if self.j < b_len {
                let next = (self.i, self.j);
                self.j += 1;
                return Some(next);
            }
            self.i += 1;
            self.j = match self.mode {
                ComparisonMode::Symmetric => self.i + 1,
                ComparisonMode::Cross => 0,
            };
        }
        None
    }

    fn compare(&mut self, i: usize, j: usize, out: &mut Vec<CollisionPair>) {
        let (a, b) = (self.a, self.b);
        let (item1, item2) = (&a[i], &b[j]);
        match self.mode {
            ComparisonMode::Symmetric => {
                if item1.aabb.intersects(&item2.aabb) {
                    out.push(CollisionPair::new(item1.clone(), item2.clone()));
                }
            }
            ComparisonMode::Cross => {
                if item1.element == item2.element {
                    return;
                }
                if item1.aabb.intersects(&item2.aabb)
                    && self.seen.insert(PairKey::new(&item1.element, &item2.element))
                {
                    out.push(CollisionPair::new(item1.clone(), item2.clone()));
                }
            }
        }
    }
}

/// Scans `boxes_a` against `boxes_b` (or `boxes_a` against itself),
/// publishing progress and yielding every few thousand comparisons.
///
/// `boxes_b` is ignored in [`ComparisonMode::Symmetric`].
pub async fn detect_collisions(
    mode: ComparisonMode,
    boxes_a: &[BoxedElement],
    boxes_b: &[BoxedElement],
    reporter: &ProgressReporter,
    cancel: &CancelToken,
    config: &DetectConfig,
) -> Result<Vec<CollisionPair>> {
    let mut scan = PairScan::new(mode, boxes_a, boxes_b);
    let every = config.report_every(mode);
    let mut pairs = Vec::new();

    loop {
        let finished = scan.step(every, &mut pairs);
        reporter.advance(scan.comparisons());
        checkpoint(cancel).await?;
        if finished {
            break;
        }
    }

    tracing::debug!(
        %mode,
        comparisons = scan.comparisons(),
        collisions = pairs.len(),
        "Pair scan complete"
    );
    Ok(pairs)
}

/// Runs a whole scan without yielding.
pub fn find_collisions(
    mode: ComparisonMode,
    boxes_a: &[BoxedElement],
    boxes_b: &[BoxedElement],
) -> Vec<CollisionPair> {
    let mut scan = PairScan::new(mode, boxes_a, boxes_b);
    let mut pairs = Vec::new();
    scan.step(u64::MAX, &mut pairs);
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_clash_core::{Aabb, ElementRef};
    use nalgebra::Point3;

    fn boxed(item: u32, min: [f64; 3], max: [f64; 3]) -> BoxedElement {
        BoxedElement::new(
            ElementRef::new("m1", item),
            Aabb::new(Point3::from(min), Point3::from(max)),
        )
    }

    /// Unit cubes along x; neighbours at distance 1 touch.
    fn row(items: &[u32]) -> Vec<BoxedElement> {
        items
            .iter()
            .map(|&item| {
                let x = item as f64;
                boxed(item, [x, 0.0, 0.0], [x + 1.0, 1.0, 1.0])
            })
            .collect()
    }

    fn ids(pairs: &[CollisionPair]) -> Vec<(u32, u32)> {
        pairs
            .iter()
            .map(|p| (p.item1.element.item_id, p.item2.element.item_id))
            .collect()
    }

    #[test]
    fn comparison_counts() {
        assert_eq!(comparison_count(ComparisonMode::Symmetric, 0, 0), 0);
        assert_eq!(comparison_count(ComparisonMode::Symmetric, 1, 0), 0);
        assert_eq!(comparison_count(ComparisonMode::Symmetric, 3, 99), 3);
        assert_eq!(comparison_count(ComparisonMode::Symmetric, 100, 0), 4950);
        assert_eq!(comparison_count(ComparisonMode::Cross, 4, 5), 20);
        assert_eq!(comparison_count(ComparisonMode::Cross, 4, 0), 0);
    }

    #[test]
    fn symmetric_visits_each_unordered_pair_once() {
        let boxes = row(&[0, 1, 2, 3]);
        let mut scan = PairScan::new(ComparisonMode::Symmetric, &boxes, &[]);
        let mut pairs = Vec::new();
        assert!(scan.step(u64::MAX, &mut pairs));
        assert_eq!(scan.comparisons(), 6);
        assert_eq!(ids(&pairs), vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn chunked_scan_matches_single_pass() {
        let boxes = row(&[0, 1, 2, 3, 4, 5, 6]);
        let expected = find_collisions(ComparisonMode::Symmetric, &boxes, &[]);

        let mut scan = PairScan::new(ComparisonMode::Symmetric, &boxes, &[]);
        let mut pairs = Vec::new();
        let mut steps = 0;
        while !scan.step(4, &mut pairs) {
            steps += 1;
        }
        assert_eq!(steps, 5); // 21 comparisons in chunks of 4
        assert_eq!(pairs, expected);
    }

    #[test]
    fn cross_skips_shared_element_and_dedupes() {
        let a = row(&[0, 1]);
        let b = row(&[0, 1]);
        let pairs = find_collisions(ComparisonMode::Cross, &a, &b);

        // (0,1) and (1,0) are the same pair; (0,0) and (1,1) are self pairs.
        assert_eq!(ids(&pairs), vec![(0, 1)]);
    }

    #[test]
    fn cross_counts_skipped_self_comparisons() {
        let a = row(&[0, 1]);
        let mut scan = PairScan::new(ComparisonMode::Cross, &a, &a);
        let mut pairs = Vec::new();
        assert!(scan.step(u64::MAX, &mut pairs));
        assert_eq!(scan.comparisons(), scan.total());
        assert_eq!(scan.total(), 4);
    }

    #[test]
    fn cross_preserves_discovery_order() {
        let a = row(&[5, 0]);
        let b = row(&[1, 4, 6]);
        let pairs = find_collisions(ComparisonMode::Cross, &a, &b);
        assert_eq!(ids(&pairs), vec![(5, 4), (5, 6), (0, 1)]);
    }

    #[test]
    fn empty_inputs_finish_immediately() {
        let mut scan = PairScan::new(ComparisonMode::Cross, &[], &[]);
        let mut pairs = Vec::new();
        assert!(scan.step(10, &mut pairs));
        assert!(pairs.is_empty());

        let single = row(&[0]);
        assert!(find_collisions(ComparisonMode::Symmetric, &single, &[]).is_empty());
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Symmetric".parse::<ComparisonMode>(), Ok(ComparisonMode::Symmetric));
        assert_eq!("cross".parse::<ComparisonMode>(), Ok(ComparisonMode::Cross));
        assert!("both".parse::<ComparisonMode>().is_err());
    }

    #[tokio::test]
    async fn cooperative_scan_reports_final_count() {
        let boxes = row(&[0, 1, 2, 3, 4]);
        let reporter = ProgressReporter::new();
        let config = DetectConfig {
            symmetric_report_every: 3,
            ..DetectConfig::default()
        };

        let pairs = detect_collisions(
            ComparisonMode::Symmetric,
            &boxes,
            &[],
            &reporter,
            &CancelToken::new(),
            &config,
        )
        .await
        .unwrap();

        assert_eq!(pairs.len(), 4);
        assert_eq!(reporter.snapshot().processed, 10);
    }

    #[tokio::test]
    async fn cancelled_scan_stops() {
        let boxes = row(&[0, 1, 2, 3]);
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = detect_collisions(
            ComparisonMode::Symmetric,
            &boxes,
            &[],
            &ProgressReporter::new(),
            &cancel,
            &DetectConfig::default(),
        )
        .await;
        assert!(matches!(result, Err(crate::Error::Cancelled)));
    }
}
