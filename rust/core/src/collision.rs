// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resolved elements and the collision pairs found between them.

use crate::aabb::Aabb;
use crate::element::ElementRef;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An element paired with its world-space bounding box.
///
/// Only built for elements whose box resolved to a non-empty box.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxedElement {
    pub element: ElementRef,
    pub aabb: Aabb,
}

impl BoxedElement {
    pub fn new(element: ElementRef, aabb: Aabb) -> Self {
        Self { element, aabb }
    }
}

/// Swap-independent identity of a pair of elements.
///
/// The smaller element (by model id, then item id) is always first, so
/// `(a, b)` and `(b, a)` produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(ElementRef, ElementRef);

impl PairKey {
    pub fn new(a: &ElementRef, b: &ElementRef) -> Self {
        if a <= b {
            Self(a.clone(), b.clone())
        } else {
            Self(b.clone(), a.clone())
        }
    }

    pub fn first(&self) -> &ElementRef {
        &self.0
    }

    pub fn second(&self) -> &ElementRef {
        &self.1
    }

    /// Whether both sides name the same element.
    pub fn is_self_pair(&self) -> bool {
        self.0 == self.1
    }
}

/// Two elements whose boxes intersect.
///
/// `item1` comes from the outer loop of the scan and `item2` from the inner
/// loop; equality of results is by [`CollisionPair::key`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionPair {
    pub item1: BoxedElement,
    pub item2: BoxedElement,
}

impl CollisionPair {
    pub fn new(item1: BoxedElement, item2: BoxedElement) -> Self {
        Self { item1, item2 }
    }

    pub fn key(&self) -> PairKey {
        PairKey::new(&self.item1.element, &self.item2.element)
    }

    /// Box enclosing both elements.
    pub fn union_box(&self) -> Aabb {
        self.item1.aabb.union(&self.item2.aabb)
    }
}
