// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounding-box resolution for the elements of a group.

use ifc_clash_core::{BoxedElement, ElementSet, GeometryProvider};

use crate::config::DetectConfig;
use crate::error::Result;
use crate::progress::{checkpoint, CancelToken, ProgressReporter};

/// Resolves the world-space box of every element in `elements`.
///
/// Each element is looked up on its own, so boxes of unrelated elements never
/// merge. Elements whose lookup fails, returns nothing, or returns an empty
/// box are skipped; the result keeps the set's enumeration order.
///
/// Progress `(processed, total)` is published after every element. The task
/// yields after the first element, every `resolve_yield_every` elements, and
/// after the last.
pub async fn resolve_boxes<G>(
    provider: &G,
    elements: &ElementSet,
    reporter: &ProgressReporter,
    cancel: &CancelToken,
    config: &DetectConfig,
) -> Result<Vec<BoxedElement>>
where
    G: GeometryProvider + Sync + ?Sized,
{
    let total = elements.len();
    let every = config.resolve_every();
    let mut boxed = Vec::with_capacity(total);
    let mut skipped = 0usize;

    for (i, element) in elements.iter().enumerate() {
        match provider.bounding_box(&ElementSet::single(&element)).await {
            Ok(Some(aabb)) if !aabb.is_empty() => boxed.push(BoxedElement::new(element, aabb)),
            Ok(_) => {
                skipped += 1;
                tracing::debug!(element = %element, "No bounding box, skipping element");
            }
            Err(e) => {
                skipped += 1;
                tracing::warn!(
                    element = %element,
                    error = %e,
                    "Could not get bounding box, skipping element"
                );
            }
        }

        reporter.advance((i + 1) as u64);
        if i % every == 0 || i + 1 == total {
            checkpoint(cancel).await?;
        }
    }

    tracing::debug!(total, resolved = boxed.len(), skipped, "Resolved bounding boxes");
    Ok(boxed)
}
