// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for element and geometry lookups.

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while naming elements or resolving their geometry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An item id carried as text is not a non-negative integer.
    #[error("invalid item id {item_id:?} in model {model_id}")]
    InvalidItemId { model_id: String, item_id: String },

    /// The model is not loaded in the geometry provider.
    #[error("model not loaded: {0}")]
    ModelNotLoaded(String),

    /// The geometry provider failed to compute a box.
    #[error("geometry lookup failed: {0}")]
    Geometry(String),
}
