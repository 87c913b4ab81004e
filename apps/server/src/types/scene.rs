// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Uploaded model documents.
//!
//! The viewer tessellates IFC geometry itself; it uploads one document per
//! loaded model with each element's category and either its box or its
//! world-space vertex positions.

use ifc_clash_core::Aabb;
use serde::Deserialize;

/// One loaded model.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelDocument {
    pub model_id: String,
    #[serde(default)]
    pub elements: Vec<ElementDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementDocument {
    pub id: u32,
    /// IFC class name, e.g. `IFCWALL`.
    pub category: String,
    /// Absent for elements without geometry (spaces, grids, ...).
    #[serde(default)]
    pub geometry: Option<GeometryDocument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryDocument {
    Box { min: [f64; 3], max: [f64; 3] },
    /// Flat `[x, y, z, ...]` world positions.
    Mesh { positions: Vec<f32> },
}

impl GeometryDocument {
    /// World-space box; empty when the geometry has no usable vertices.
    pub fn aabb(&self) -> Aabb {
        match self {
            GeometryDocument::Box { min, max } => Aabb::from_corners(*min, *max),
            GeometryDocument::Mesh { positions } => Aabb::from_positions(positions),
        }
    }
}
