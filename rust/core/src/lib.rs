// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Clash Core
//!
//! Data model shared by the clash detector and its hosts.
//!
//! ## Overview
//!
//! - **Elements**: [`ElementRef`] names one element of a loaded model, and
//!   [`ElementSet`] is the `model id -> item ids` shape exchanged with the
//!   viewer's selection, category and geometry capabilities
//! - **Groups**: [`Group`] accumulates elements plus the labelled additions
//!   ("Selection", a category name) that built it
//! - **Boxes**: [`Aabb`] with inclusive intersection semantics
//! - **Results**: [`BoxedElement`] and [`CollisionPair`], with [`PairKey`]
//!   giving a pair its swap-independent identity
//! - **Providers**: the traits a host implements to feed geometry, categories
//!   and the interactive selection into detection
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_clash_core::{Aabb, ElementRef, Group};
//! use nalgebra::Point3;
//!
//! let mut group = Group::new();
//! group.insert(ElementRef::new("m1", 10));
//!
//! let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
//! let b = Aabb::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
//! assert!(a.intersects(&b)); // touching faces count
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for all data types

pub mod aabb;
pub mod collision;
pub mod element;
pub mod error;
pub mod group;
pub mod provider;

pub use aabb::Aabb;
pub use collision::{BoxedElement, CollisionPair, PairKey};
pub use element::{ElementRef, ElementSet};
pub use error::{Error, Result};
pub use group::{Group, GroupEntry, SELECTION_ENTRY};
pub use provider::{CategoryProvider, GeometryProvider, SelectionProvider};
