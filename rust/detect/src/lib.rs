// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Clash Detect
//!
//! Pairwise bounding-box clash detection between two groups of BIM elements.
//!
//! ## Overview
//!
//! - **Group building**: add the interactive selection or a whole category to
//!   group A or B ([`builder`])
//! - **Box resolution**: ask the host's geometry provider for one element's
//!   box at a time, skipping elements without geometry ([`resolver`])
//! - **Pair scan**: compare every box of A against every box of B, or a group
//!   against itself, in bounded chunks ([`engine`])
//! - **Progress**: `(processed, total, status)` published on a watch channel,
//!   with cooperative yields between chunks and a cancel token ([`progress`])
//!
//! [`ClashDetector`] ties these together into one session.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_clash_detect::{CancelToken, ClashDetector, ComparisonMode, DetectConfig, GroupId};
//!
//! let mut detector = ClashDetector::new(DetectConfig::default());
//! detector.add_category(GroupId::A, &scene, "IFCWALL");
//! detector.add_category(GroupId::B, &scene, "IFCDUCTSEGMENT");
//!
//! let mut progress = detector.subscribe();
//! let report = detector
//!     .run(&scene, ComparisonMode::Cross, &CancelToken::new())
//!     .await?;
//! println!("{}", report.status);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization of reports, progress and focus data

pub mod builder;
pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod focus;
pub mod progress;
pub mod resolver;

pub use builder::{add_category_to_group, add_selection_to_group, clear_group, AddOutcome};
pub use config::DetectConfig;
pub use detector::{ClashDetector, DetectionReport, GroupId, RunStatus};
pub use engine::{comparison_count, detect_collisions, find_collisions, ComparisonMode, PairScan};
pub use error::{Error, Result};
pub use focus::{Highlight, HighlightColor, PairFocus};
pub use progress::{CancelToken, Phase, Progress, ProgressReporter};
pub use resolver::resolve_boxes;
