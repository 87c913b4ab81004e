// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Open clash detection sessions.
//!
//! A session's detector sits behind an async mutex that a run holds for its
//! whole duration. Edits and second runs use `try_lock` and are turned away
//! while a run is in flight. Progress, cancellation and the interactive
//! selection live outside that lock so they stay reachable during a run.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use ifc_clash_core::{ElementSet, SelectionProvider};
use ifc_clash_detect::{CancelToken, ClashDetector, DetectConfig, Progress};
use rustc_hash::FxHashMap;
use tokio::sync::{watch, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::ApiError;

/// The viewer's current multi-selection for one session.
#[derive(Debug, Default)]
pub struct Selection {
    elements: ElementSet,
}

impl Selection {
    pub fn replace(&mut self, elements: ElementSet) {
        self.elements = elements;
    }
}

impl SelectionProvider for Selection {
    fn selection(&self) -> ElementSet {
        self.elements.clone()
    }

    fn clear_selection(&mut self) {
        self.elements.clear();
    }
}

/// One session's shared state.
#[derive(Debug)]
pub struct SessionHandle {
    id: Uuid,
    detector: Arc<tokio::sync::Mutex<ClashDetector>>,
    selection: Mutex<Selection>,
    cancel: Mutex<CancelToken>,
    progress: watch::Receiver<Progress>,
}

impl SessionHandle {
    fn new(id: Uuid, config: DetectConfig) -> Self {
        let detector = ClashDetector::new(config);
        let progress = detector.subscribe();
        Self {
            id,
            detector: Arc::new(tokio::sync::Mutex::new(detector)),
            selection: Mutex::new(Selection::default()),
            cancel: Mutex::new(CancelToken::new()),
            progress,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Exclusive access to the detector, or `SessionBusy` while a run holds it.
    pub fn lock(&self) -> Result<OwnedMutexGuard<ClashDetector>, ApiError> {
        Arc::clone(&self.detector)
            .try_lock_owned()
            .map_err(|_| ApiError::SessionBusy)
    }

    /// Runs `f` on the interactive selection.
    pub fn with_selection<R>(&self, f: impl FnOnce(&mut Selection) -> R) -> R {
        let mut selection = self.selection.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut selection)
    }

    /// Latest progress snapshot, readable during a run.
    pub fn progress(&self) -> Progress {
        self.progress.borrow().clone()
    }

    /// Fresh cancel token for a run that is about to start.
    pub fn begin_run(&self) -> CancelToken {
        let token = CancelToken::new();
        *self.cancel.lock().unwrap_or_else(PoisonError::into_inner) = token.clone();
        token
    }

    /// Cancels the in-flight run, if any.
    pub fn cancel(&self) {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }
}

/// All open sessions by id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<FxHashMap<Uuid, Arc<SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, config: DetectConfig) -> Arc<SessionHandle> {
        let id = Uuid::new_v4();
        let handle = Arc::new(SessionHandle::new(id, config));
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&handle));
        tracing::info!(session = %id, "Opened session");
        handle
    }

    pub fn get(&self, id: Uuid) -> Result<Arc<SessionHandle>, ApiError> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("session {id}")))
    }

    /// Removes a session and cancels its run, if one is in flight.
    pub fn close(&self, id: Uuid) -> Result<(), ApiError> {
        let handle = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .ok_or_else(|| ApiError::NotFound(format!("session {id}")))?;
        handle.cancel();
        tracing::info!(session = %id, "Closed session");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
