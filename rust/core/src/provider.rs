// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capabilities a host injects into clash detection.
//!
//! The viewer owns model geometry, category metadata and the interactive
//! selection. Detection only sees them through these traits, so a host can be
//! a 3D viewer, an HTTP service, or an in-memory test double.

use std::future::Future;

use crate::aabb::Aabb;
use crate::element::ElementSet;
use crate::error::Result;

/// Computes world-space bounding boxes.
///
/// Each call is scoped to the elements passed in; implementations must not
/// carry geometry over from one call to the next.
pub trait GeometryProvider {
    /// Bounding box of `elements`, or `None` if none of them has geometry.
    ///
    /// Implementations may return an empty box instead of `None`; callers
    /// treat both the same way.
    fn bounding_box(
        &self,
        elements: &ElementSet,
    ) -> impl Future<Output = Result<Option<Aabb>>> + Send;
}

/// Looks up elements by category across every loaded model.
pub trait CategoryProvider {
    /// Elements whose category equals `category` exactly.
    fn elements_by_category(&self, category: &str) -> ElementSet;

    /// Every distinct category name present in the loaded models.
    fn categories(&self) -> Vec<String>;
}

/// The viewer's interactive multi-selection.
pub trait SelectionProvider {
    fn selection(&self) -> ElementSet;

    fn clear_selection(&mut self);
}

impl<T: GeometryProvider + Sync> GeometryProvider for &T {
    fn bounding_box(
        &self,
        elements: &ElementSet,
    ) -> impl Future<Output = Result<Option<Aabb>>> + Send {
        (**self).bounding_box(elements)
    }
}

impl<T: CategoryProvider> CategoryProvider for &T {
    fn elements_by_category(&self, category: &str) -> ElementSet {
        (**self).elements_by_category(category)
    }

    fn categories(&self) -> Vec<String> {
        (**self).categories()
    }
}
