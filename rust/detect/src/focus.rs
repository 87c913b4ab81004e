// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! What a viewer needs to show one collision: which elements to isolate and
//! highlight, and where to put the camera.

use ifc_clash_core::{Aabb, CollisionPair, ElementRef, ElementSet};
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Highlight colour for one side of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HighlightColor {
    /// First element of the pair.
    Red,
    /// Second element of the pair.
    Orange,
}

impl HighlightColor {
    /// sRGB hex string.
    pub fn hex(&self) -> &'static str {
        match self {
            HighlightColor::Red => "#ff0000",
            HighlightColor::Orange => "#ffa500",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Highlight {
    pub element: ElementRef,
    pub color: HighlightColor,
}

/// Isolation, highlight and camera data for one collision.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PairFocus {
    /// Elements to keep visible; everything else is hidden.
    pub isolate: ElementSet,
    pub highlights: Vec<Highlight>,
    /// Box enclosing both elements.
    pub union_box: Aabb,
    pub size: Vector3<f64>,
    /// Camera look-at target: center of the union box.
    pub target: Point3<f64>,
    /// Camera position: target offset by the union box size.
    pub eye: Point3<f64>,
}

impl PairFocus {
    pub fn from_pair(pair: &CollisionPair) -> Self {
        let isolate: ElementSet = [pair.item1.element.clone(), pair.item2.element.clone()]
            .into_iter()
            .collect();
        let union_box = pair.union_box();
        let target = union_box.center();
        let size = union_box.size();

        Self {
            isolate,
            highlights: vec![
                Highlight {
                    element: pair.item1.element.clone(),
                    color: HighlightColor::Red,
                },
                Highlight {
                    element: pair.item2.element.clone(),
                    color: HighlightColor::Orange,
                },
            ],
            union_box,
            size,
            target,
            eye: target + size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ifc_clash_core::BoxedElement;

    #[test]
    fn focus_frames_both_elements() {
        let pair = CollisionPair::new(
            BoxedElement::new(
                ElementRef::new("m1", 10),
                Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)),
            ),
            BoxedElement::new(
                ElementRef::new("m2", 20),
                Aabb::new(Point3::new(0.5, 0.5, 0.5), Point3::new(2.0, 3.0, 4.0)),
            ),
        );

        let focus = PairFocus::from_pair(&pair);

        assert_eq!(focus.isolate.len(), 2);
        assert_eq!(focus.highlights[0].element, ElementRef::new("m1", 10));
        assert_eq!(focus.highlights[0].color.hex(), "#ff0000");
        assert_eq!(focus.highlights[1].color, HighlightColor::Orange);

        assert_relative_eq!(focus.target, Point3::new(1.0, 1.5, 2.0));
        assert_relative_eq!(focus.size, Vector3::new(2.0, 3.0, 4.0));
        assert_relative_eq!(focus.eye, Point3::new(3.0, 4.5, 6.0));
    }
}
