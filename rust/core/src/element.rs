// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element identifiers and element sets.
//!
//! An [`ElementRef`] is unique within a loaded model and stable for the
//! lifetime of that model's load session. Ordered containers keep the
//! enumeration order of an [`ElementSet`] fixed, so repeated scans over the
//! same set visit elements in the same order.

use std::collections::{btree_map, BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One element of a loaded model.
///
/// Ordered by `(model_id, item_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElementRef {
    pub model_id: String,
    pub item_id: u32,
}

impl ElementRef {
    pub fn new(model_id: impl Into<String>, item_id: u32) -> Self {
        Self {
            model_id: model_id.into(),
            item_id,
        }
    }

    /// Builds a reference from an item id carried as text.
    ///
    /// Surrounding whitespace is ignored; anything else that is not a `u32`
    /// is rejected.
    pub fn parse(model_id: impl Into<String>, item_id: &str) -> Result<Self> {
        let model_id = model_id.into();
        match item_id.trim().parse::<u32>() {
            Ok(id) => Ok(Self::new(model_id, id)),
            Err(_) => Err(Error::InvalidItemId {
                model_id,
                item_id: item_id.to_string(),
            }),
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.model_id, self.item_id)
    }
}

/// A mapping from model id to a set of item ids.
///
/// This is the shape the viewer's selection and category queries produce
/// and the geometry provider consumes. Duplicates collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ElementSet {
    models: BTreeMap<String, BTreeSet<u32>>,
}

impl ElementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding exactly one element.
    pub fn single(element: &ElementRef) -> Self {
        let mut set = Self::new();
        set.insert(element.clone());
        set
    }

    /// Adds an element. Returns `false` if it was already present.
    pub fn insert(&mut self, element: ElementRef) -> bool {
        self.models
            .entry(element.model_id)
            .or_default()
            .insert(element.item_id)
    }

    /// Adds every item id under one model.
    pub fn extend_model<I>(&mut self, model_id: &str, item_ids: I)
    where
        I: IntoIterator<Item = u32>,
    {
        let mut ids = item_ids.into_iter().peekable();
        if ids.peek().is_none() {
            return;
        }
        match self.models.get_mut(model_id) {
            Some(existing) => existing.extend(ids),
            None => {
                self.models.insert(model_id.to_string(), ids.collect());
            }
        }
    }

    /// Unions `other` into `self`.
    pub fn union_with(&mut self, other: &ElementSet) {
        for (model_id, ids) in &other.models {
            self.extend_model(model_id, ids.iter().copied());
        }
    }

    pub fn contains(&self, element: &ElementRef) -> bool {
        self.models
            .get(&element.model_id)
            .is_some_and(|ids| ids.contains(&element.item_id))
    }

    /// Total number of elements across all models.
    pub fn len(&self) -> usize {
        self.models.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.models.values().all(BTreeSet::is_empty)
    }

    pub fn clear(&mut self) {
        self.models.clear();
    }

    /// Model ids with at least one item.
    pub fn model_ids(&self) -> impl Iterator<Item = &str> {
        self.models
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(model_id, _)| model_id.as_str())
    }

    /// Item ids under one model, in ascending order.
    pub fn items(&self, model_id: &str) -> impl Iterator<Item = u32> + '_ {
        self.models
            .get(model_id)
            .into_iter()
            .flat_map(|ids| ids.iter().copied())
    }

    /// All elements, model by model, item ids ascending.
    pub fn iter(&self) -> impl Iterator<Item = ElementRef> + '_ {
        self.models.iter().flat_map(|(model_id, ids)| {
            ids.iter().map(move |&item_id| ElementRef::new(model_id.clone(), item_id))
        })
    }

    /// Per-model view, for hosts that talk to model-scoped APIs.
    pub fn by_model(&self) -> btree_map::Iter<'_, String, BTreeSet<u32>> {
        self.models.iter()
    }
}

impl FromIterator<ElementRef> for ElementSet {
    fn from_iter<T: IntoIterator<Item = ElementRef>>(iter: T) -> Self {
        let mut set = Self::new();
        for element in iter {
            set.insert(element);
        }
        set
    }
}

impl Extend<ElementRef> for ElementSet {
    fn extend<T: IntoIterator<Item = ElementRef>>(&mut self, iter: T) {
        for element in iter {
            self.insert(element);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_integer_text() {
        let element = ElementRef::parse("m1", " 42 ").unwrap();
        assert_eq!(element, ElementRef::new("m1", 42));
    }

    #[test]
    fn parse_rejects_non_integer_text() {
        for bad in ["", "abc", "-3", "1.5", "4294967296"] {
            let err = ElementRef::parse("m1", bad).unwrap_err();
            assert!(matches!(err, Error::InvalidItemId { .. }), "accepted {bad:?}");
        }
    }

    #[test]
    fn element_ordering_is_model_then_item() {
        let mut refs = vec![
            ElementRef::new("m2", 1),
            ElementRef::new("m1", 30),
            ElementRef::new("m1", 4),
        ];
        refs.sort();
        assert_eq!(
            refs,
            vec![
                ElementRef::new("m1", 4),
                ElementRef::new("m1", 30),
                ElementRef::new("m2", 1),
            ]
        );
    }

    #[test]
    fn display_joins_model_and_item() {
        assert_eq!(ElementRef::new("model-a", 7).to_string(), "model-a-7");
    }

    #[test]
    fn duplicates_collapse() {
        let mut set = ElementSet::new();
        assert!(set.insert(ElementRef::new("m1", 1)));
        assert!(!set.insert(ElementRef::new("m1", 1)));
        set.extend_model("m1", [1, 2, 2, 3]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn union_merges_models() {
        let mut a: ElementSet = [ElementRef::new("m1", 1), ElementRef::new("m2", 5)]
            .into_iter()
            .collect();
        let b: ElementSet = [ElementRef::new("m1", 2), ElementRef::new("m3", 9)]
            .into_iter()
            .collect();
        a.union_with(&b);

        assert_eq!(a.len(), 4);
        assert_eq!(a.model_ids().collect::<Vec<_>>(), vec!["m1", "m2", "m3"]);
        assert_eq!(a.items("m1").collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn iteration_order_is_fixed() {
        let set: ElementSet = [
            ElementRef::new("m2", 3),
            ElementRef::new("m1", 20),
            ElementRef::new("m1", 10),
        ]
        .into_iter()
        .collect();

        let first: Vec<_> = set.iter().collect();
        let second: Vec<_> = set.iter().collect();
        assert_eq!(first, second);
        assert_eq!(first[0], ElementRef::new("m1", 10));
        assert_eq!(first[2], ElementRef::new("m2", 3));
    }

    #[test]
    fn empty_model_entries_do_not_count() {
        let mut set = ElementSet::new();
        set.extend_model("m1", std::iter::empty());
        assert!(set.is_empty());
        assert_eq!(set.model_ids().count(), 0);
    }
}
