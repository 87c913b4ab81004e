// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Progress cadence for detection runs.

use std::time::Duration;

use crate::engine::ComparisonMode;

/// How often a run reports progress and yields to the runtime.
#[derive(Debug, Clone)]
pub struct DetectConfig {
    /// Yield after resolving element 0, every Nth element after it, and the last.
    pub resolve_yield_every: usize,
    /// Comparisons between progress reports when a group is scanned against itself.
    pub symmetric_report_every: u64,
    /// Comparisons between progress reports when scanning A against B.
    pub cross_report_every: u64,
    /// How long a host should keep a terminal status message visible.
    pub status_hold: Duration,
}

impl DetectConfig {
    /// Reporting interval for `mode`, never zero.
    pub fn report_every(&self, mode: ComparisonMode) -> u64 {
        let every = match mode {
            ComparisonMode::Symmetric => self.symmetric_report_every,
            ComparisonMode::Cross => self.cross_report_every,
        };
        every.max(1)
    }

    /// Resolver yield interval, never zero.
    pub fn resolve_every(&self) -> usize {
        self.resolve_yield_every.max(1)
    }
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            resolve_yield_every: 20,
            symmetric_report_every: 10_000,
            cross_report_every: 1_000,
            status_hold: Duration::from_secs(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_intervals_are_clamped() {
        let config = DetectConfig {
            resolve_yield_every: 0,
            symmetric_report_every: 0,
            cross_report_every: 0,
            ..DetectConfig::default()
        };
        assert_eq!(config.resolve_every(), 1);
        assert_eq!(config.report_every(ComparisonMode::Symmetric), 1);
        assert_eq!(config.report_every(ComparisonMode::Cross), 1);
    }

    #[test]
    fn symmetric_reports_less_often() {
        let config = DetectConfig::default();
        assert!(
            config.report_every(ComparisonMode::Symmetric)
                > config.report_every(ComparisonMode::Cross)
        );
    }
}
