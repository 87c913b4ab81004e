// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Service modules for loaded models, sessions and streamed runs.

pub mod scene;
pub mod sessions;
pub mod streaming;

pub use scene::SceneStore;
pub use sessions::SessionStore;
pub use streaming::run_streaming;
