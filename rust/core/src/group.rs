// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named groups of elements selected for comparison.

use crate::element::{ElementRef, ElementSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Entry name recorded when the interactive selection is added to a group.
pub const SELECTION_ENTRY: &str = "Selection";

/// One labelled addition to a group: the interactive selection or a category.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupEntry {
    pub name: String,
    /// Number of items the addition contributed before de-duplication.
    pub count: usize,
}

/// A set of elements plus the history of additions that built it.
///
/// Only grown by [`Group::add`] and emptied by [`Group::clear`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Group {
    elements: ElementSet,
    entries: Vec<GroupEntry>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unions `elements` into the group and records the addition under `name`.
    ///
    /// Returns the number of items in `elements`, which may include items
    /// already present in the group.
    pub fn add(&mut self, name: impl Into<String>, elements: &ElementSet) -> usize {
        let count = elements.len();
        self.elements.union_with(elements);
        self.entries.push(GroupEntry {
            name: name.into(),
            count,
        });
        count
    }

    /// Inserts one element without recording an entry.
    pub fn insert(&mut self, element: ElementRef) -> bool {
        self.elements.insert(element)
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.entries.clear();
    }

    pub fn elements(&self) -> &ElementSet {
        &self.elements
    }

    pub fn entries(&self) -> &[GroupEntry] {
        &self.entries
    }

    pub fn contains(&self, element: &ElementRef) -> bool {
        self.elements.contains(element)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in the group's fixed enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = ElementRef> + '_ {
        self.elements.iter()
    }

    /// Whether a category has already been added under its own name.
    pub fn has_entry(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    /// The categories from `all` that have not yet been added to this group.
    pub fn available_categories<'a, I>(&self, all: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        all.into_iter()
            .filter(|category| !self.has_entry(category))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[(&str, u32)]) -> ElementSet {
        items
            .iter()
            .map(|(model, item)| ElementRef::new(*model, *item))
            .collect()
    }

    #[test]
    fn add_unions_and_records_entry() {
        let mut group = Group::new();
        let added = group.add("IFCWALL", &set(&[("m1", 1), ("m1", 2)]));
        assert_eq!(added, 2);

        let added = group.add(SELECTION_ENTRY, &set(&[("m1", 2), ("m2", 7)]));
        assert_eq!(added, 2);

        assert_eq!(group.len(), 3);
        assert_eq!(
            group.entries(),
            &[
                GroupEntry {
                    name: "IFCWALL".into(),
                    count: 2
                },
                GroupEntry {
                    name: SELECTION_ENTRY.into(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn clear_drops_elements_and_entries() {
        let mut group = Group::new();
        group.add("IFCSLAB", &set(&[("m1", 1)]));
        group.clear();
        assert!(group.is_empty());
        assert!(group.entries().is_empty());
    }

    #[test]
    fn available_categories_skip_added_ones() {
        let mut group = Group::new();
        group.add("IFCWALL", &set(&[("m1", 1)]));

        let all = ["IFCWALL", "IFCSLAB", "IFCBEAM"];
        assert_eq!(group.available_categories(all), vec!["IFCSLAB", "IFCBEAM"]);
    }

    #[test]
    fn adding_never_removes_elements() {
        let mut group = Group::new();
        group.add("a", &set(&[("m1", 1), ("m1", 2)]));
        let before: Vec<_> = group.iter().collect();

        group.add("b", &set(&[("m1", 3)]));
        for element in &before {
            assert!(group.contains(element));
        }
    }
}
