// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building comparison groups from the selection or a category.

use std::fmt;

use ifc_clash_core::{CategoryProvider, Group, SelectionProvider, SELECTION_ENTRY};

/// What an "add to group" request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Elements were unioned into the group under an entry `name`.
    Added { name: String, count: usize },
    /// The interactive selection was empty; the group is unchanged.
    NothingSelected,
    /// No category name was given; the group is unchanged.
    NoCategory,
}

impl AddOutcome {
    /// Number of items the request contributed.
    pub fn count(&self) -> usize {
        match self {
            AddOutcome::Added { count, .. } => *count,
            _ => 0,
        }
    }
}

impl fmt::Display for AddOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddOutcome::Added { name, count } => write!(f, "Added {count} items from {name}."),
            AddOutcome::NothingSelected => f.write_str("No items selected."),
            AddOutcome::NoCategory => f.write_str("No category chosen."),
        }
    }
}

/// Unions the interactive selection into `group`, then clears the selection.
///
/// Clearing keeps repeated calls additive: the same picks are never counted
/// twice.
pub fn add_selection_to_group<S>(selection: &mut S, group: &mut Group) -> AddOutcome
where
    S: SelectionProvider + ?Sized,
{
    let picked = selection.selection();
    if picked.is_empty() {
        tracing::debug!("Add selection requested with nothing selected");
        return AddOutcome::NothingSelected;
    }

    let count = group.add(SELECTION_ENTRY, &picked);
    selection.clear_selection();
    tracing::debug!(count, group_size = group.len(), "Added selection to group");

    AddOutcome::Added {
        name: SELECTION_ENTRY.to_string(),
        count,
    }
}

/// Unions every element whose category is exactly `category` into `group`.
///
/// The addition is recorded even when no element matches, so the category is
/// no longer offered for this group.
pub fn add_category_to_group<C>(provider: &C, category: &str, group: &mut Group) -> AddOutcome
where
    C: CategoryProvider + ?Sized,
{
    if category.is_empty() {
        return AddOutcome::NoCategory;
    }

    let matches = provider.elements_by_category(category);
    let count = group.add(category, &matches);
    tracing::debug!(category, count, group_size = group.len(), "Added category to group");

    AddOutcome::Added {
        name: category.to_string(),
        count,
    }
}

/// Empties `group` and forgets how it was built.
pub fn clear_group(group: &mut Group) {
    group.clear();
}
