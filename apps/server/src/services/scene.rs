// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loaded models, served to detection as geometry and category lookups.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock};

use ifc_clash_core::{Aabb, CategoryProvider, ElementSet, Error, GeometryProvider, Result};
use rustc_hash::FxHashMap;

use crate::types::{ModelDocument, ModelSummary};

#[derive(Debug, Clone)]
struct SceneElement {
    category: String,
    /// `None` for elements uploaded without geometry.
    aabb: Option<Aabb>,
}

#[derive(Debug, Default)]
struct SceneModel {
    elements: BTreeMap<u32, SceneElement>,
}

impl SceneModel {
    fn from_document(document: ModelDocument) -> Self {
        let elements = document
            .elements
            .into_iter()
            .map(|element| {
                let aabb = element.geometry.as_ref().map(|geometry| geometry.aabb());
                (
                    element.id,
                    SceneElement {
                        category: element.category,
                        aabb,
                    },
                )
            })
            .collect();
        Self { elements }
    }

    fn categories(&self) -> BTreeSet<&str> {
        self.elements
            .values()
            .map(|element| element.category.as_str())
            .collect()
    }

    fn summary(&self, model_id: &str) -> ModelSummary {
        ModelSummary {
            model_id: model_id.to_string(),
            element_count: self.elements.len(),
            categories: self.categories().into_iter().map(str::to_string).collect(),
        }
    }
}

/// Every model the viewer has uploaded.
#[derive(Debug, Default)]
pub struct SceneStore {
    models: RwLock<FxHashMap<String, SceneModel>>,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a model, replacing any model with the same id.
    pub fn load(&self, document: ModelDocument) -> ModelSummary {
        let model_id = document.model_id.clone();
        let model = SceneModel::from_document(document);
        let summary = model.summary(&model_id);

        let replaced = self
            .models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(model_id.clone(), model)
            .is_some();

        tracing::info!(
            model_id = %model_id,
            elements = summary.element_count,
            replaced,
            "Loaded model"
        );
        summary
    }

    /// Returns `false` if no model had this id.
    pub fn unload(&self, model_id: &str) -> bool {
        let removed = self
            .models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(model_id)
            .is_some();
        if removed {
            tracing::info!(model_id, "Unloaded model");
        }
        removed
    }

    /// Loaded models ordered by id.
    pub fn list(&self) -> Vec<ModelSummary> {
        let models = self.models.read().unwrap_or_else(PoisonError::into_inner);
        let mut summaries: Vec<_> = models
            .iter()
            .map(|(model_id, model)| model.summary(model_id))
            .collect();
        summaries.sort_by(|a, b| a.model_id.cmp(&b.model_id));
        summaries
    }

    fn union_box(&self, elements: &ElementSet) -> Result<Option<Aabb>> {
        let models = self.models.read().unwrap_or_else(PoisonError::into_inner);
        let mut aabb = Aabb::empty();
        for (model_id, ids) in elements.by_model() {
            let model = models
                .get(model_id)
                .ok_or_else(|| Error::ModelNotLoaded(model_id.clone()))?;
            for id in ids {
                if let Some(element_box) = model.elements.get(id).and_then(|e| e.aabb) {
                    aabb = aabb.union(&element_box);
                }
            }
        }
        Ok((!aabb.is_empty()).then_some(aabb))
    }
}

impl GeometryProvider for SceneStore {
    async fn bounding_box(&self, elements: &ElementSet) -> Result<Option<Aabb>> {
        self.union_box(elements)
    }
}

impl CategoryProvider for SceneStore {
    fn elements_by_category(&self, category: &str) -> ElementSet {
        let models = self.models.read().unwrap_or_else(PoisonError::into_inner);
        let mut found = ElementSet::new();
        for (model_id, model) in models.iter() {
            found.extend_model(
                model_id,
                model
                    .elements
                    .iter()
                    .filter(|(_, element)| element.category == category)
                    .map(|(&id, _)| id),
            );
        }
        found
    }

    fn categories(&self) -> Vec<String> {
        let models = self.models.read().unwrap_or_else(PoisonError::into_inner);
        let all: BTreeSet<&str> = models.values().flat_map(SceneModel::categories).collect();
        all.into_iter().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_clash_core::ElementRef;

    fn document(json: &str) -> ModelDocument {
        serde_json::from_str(json).unwrap()
    }

    fn scene() -> SceneStore {
        let scene = SceneStore::new();
        scene.load(document(
            r#"{
                "model_id": "arch",
                "elements": [
                    {"id": 1, "category": "IFCWALL",
                     "geometry": {"box": {"min": [0, 0, 0], "max": [1, 1, 1]}}},
                    {"id": 2, "category": "IFCWALL",
                     "geometry": {"mesh": {"positions": [4, 4, 4, 5, 6, 7]}}},
                    {"id": 3, "category": "IFCSPACE"}
                ]
            }"#,
        ));
        scene.load(document(
            r#"{
                "model_id": "mep",
                "elements": [
                    {"id": 7, "category": "IFCDUCTSEGMENT",
                     "geometry": {"box": {"min": [0.5, 0.5, 0.5], "max": [2, 2, 2]}}},
                    {"id": 8, "category": "IFCWALLSTANDARDCASE",
                     "geometry": {"mesh": {"positions": []}}}
                ]
            }"#,
        ));
        scene
    }

    #[tokio::test]
    async fn single_element_boxes() {
        let scene = scene();
        let wall = scene
            .bounding_box(&ElementSet::single(&ElementRef::new("arch", 2)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(wall, Aabb::from_corners([4.0, 4.0, 4.0], [5.0, 6.0, 7.0]));

        let space = scene
            .bounding_box(&ElementSet::single(&ElementRef::new("arch", 3)))
            .await
            .unwrap();
        assert!(space.is_none());

        let empty_mesh = scene
            .bounding_box(&ElementSet::single(&ElementRef::new("mep", 8)))
            .await
            .unwrap();
        assert!(empty_mesh.is_none());
    }

    #[tokio::test]
    async fn unknown_model_is_an_error() {
        let scene = scene();
        let result = scene
            .bounding_box(&ElementSet::single(&ElementRef::new("structure", 1)))
            .await;
        assert!(matches!(result, Err(Error::ModelNotLoaded(id)) if id == "structure"));
    }

    #[test]
    fn category_lookup_is_exact() {
        let scene = scene();
        let walls = scene.elements_by_category("IFCWALL");

        assert_eq!(walls.len(), 2);
        assert!(walls.contains(&ElementRef::new("arch", 1)));
        assert!(!walls.contains(&ElementRef::new("mep", 8)));
        assert!(scene.elements_by_category("IFCBEAM").is_empty());
    }

    #[test]
    fn categories_are_distinct_and_sorted() {
        assert_eq!(
            scene().categories(),
            vec!["IFCDUCTSEGMENT", "IFCSPACE", "IFCWALL", "IFCWALLSTANDARDCASE"]
        );
    }

    #[test]
    fn reload_replaces_and_unload_removes() {
        let scene = scene();
        let summary = scene.load(document(r#"{"model_id": "mep"}"#));
        assert_eq!(summary.element_count, 0);
        assert!(scene.elements_by_category("IFCDUCTSEGMENT").is_empty());

        assert!(scene.unload("mep"));
        assert!(!scene.unload("mep"));
        let remaining: Vec<_> = scene.list().into_iter().map(|m| m.model_id).collect();
        assert_eq!(remaining, vec!["arch".to_string()]);
    }
}
