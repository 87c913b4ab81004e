// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request types for the API.

use std::collections::BTreeMap;

use ifc_clash_core::{ElementRef, ElementSet};
use ifc_clash_detect::ComparisonMode;
use serde::Deserialize;

/// Options for a detection run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunRequest {
    /// Defaults to comparing group A against group B.
    #[serde(default)]
    pub mode: ComparisonMode,
}

impl RunRequest {
    /// Parses a run body; an empty body means the defaults.
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }
}

/// Adds one category to a group.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRequest {
    pub category: String,
}

/// Replaces the interactive selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionRequest {
    /// Model id to item ids.
    #[serde(default)]
    pub selection: BTreeMap<String, Vec<ItemIdInput>>,
}

/// Viewers send item ids either as numbers or as numeric strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ItemIdInput {
    Number(i64),
    Text(String),
}

impl ItemIdInput {
    fn to_element(&self, model_id: &str) -> Option<ElementRef> {
        match self {
            ItemIdInput::Number(n) => u32::try_from(*n)
                .ok()
                .map(|id| ElementRef::new(model_id, id)),
            ItemIdInput::Text(text) => ElementRef::parse(model_id, text).ok(),
        }
    }
}

impl SelectionRequest {
    /// Builds the selection, returning the ids that were not valid item ids.
    pub fn into_elements(self) -> (ElementSet, Vec<String>) {
        let mut elements = ElementSet::new();
        let mut skipped = Vec::new();
        for (model_id, ids) in &self.selection {
            for id in ids {
                match id.to_element(model_id) {
                    Some(element) => {
                        elements.insert(element);
                    }
                    None => {
                        let raw = match id {
                            ItemIdInput::Number(n) => n.to_string(),
                            ItemIdInput::Text(text) => text.clone(),
                        };
                        tracing::warn!(model_id = %model_id, item_id = %raw, "Skipping invalid item id");
                        skipped.push(format!("{model_id}-{raw}"));
                    }
                }
            }
        }
        (elements, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_body_defaults_only_when_empty() {
        assert_eq!(RunRequest::from_body(b"").unwrap().mode, ComparisonMode::Cross);
        assert_eq!(RunRequest::from_body(b" \n").unwrap().mode, ComparisonMode::Cross);
        assert_eq!(RunRequest::from_body(b"{}").unwrap().mode, ComparisonMode::Cross);
        assert_eq!(
            RunRequest::from_body(br#"{"mode":"symmetric"}"#).unwrap().mode,
            ComparisonMode::Symmetric
        );
        assert!(RunRequest::from_body(br#"{"mode":"symetric"}"#).is_err());
        assert!(RunRequest::from_body(b"{").is_err());
    }

    #[test]
    fn mixed_ids_parse_and_invalid_ones_are_skipped() {
        let request: SelectionRequest = serde_json::from_str(
            r#"{"selection": {"m1": [1, "2", " 3 ", "abc", -4], "m2": []}}"#,
        )
        .unwrap();
        let (elements, skipped) = request.into_elements();

        assert_eq!(elements.len(), 3);
        assert!(elements.contains(&ElementRef::new("m1", 3)));
        assert_eq!(skipped, vec!["m1-abc".to_string(), "m1--4".to_string()]);
    }

    #[test]
    fn run_mode_defaults_to_cross() {
        let request: RunRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.mode, ComparisonMode::Cross);
    }
}
