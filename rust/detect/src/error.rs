// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for detection runs.
//!
//! Per-element lookup failures and empty inputs are not errors; they shrink
//! or empty the result. Only an explicit cancel aborts a run.

/// Result type alias for detection operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The run was cancelled through its [`CancelToken`](crate::CancelToken).
    #[error("detection cancelled")]
    Cancelled,
}
