//! Per-client workflow state: the last job id and download key.
//!
//! Each slot holds one value and is overwritten by the next async create or
//! completed status check. Two workflows sharing one client will clobber each
//! other; use one client per workflow or pass ids explicitly.

use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default, Clone)]
struct SessionState {
    status_id: Option<String>,
    download_key: Option<String>,
}

/// Last-seen `status_id` and `download_key`.
#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    /// Most recent async job id.
    #[must_use]
    pub fn status_id(&self) -> Option<String> {
        self.lock().status_id.clone()
    }

    /// Most recent download key from a completed status check.
    #[must_use]
    pub fn download_key(&self) -> Option<String> {
        self.lock().download_key.clone()
    }

    pub(crate) fn set_status_id(&self, status_id: impl Into<String>) {
        self.lock().status_id = Some(status_id.into());
    }

    pub(crate) fn set_download_key(&self, download_key: impl Into<String>) {
        self.lock().download_key = Some(download_key.into());
    }

    /// Forgets both cached values.
    pub fn clear(&self) {
        *self.lock() = SessionState::default();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
