//! Client-local marker storage.
//!
//! A tiny synchronous key-value surface modeled on browser local
//! storage: string keys, string values, and a medium that can refuse to
//! work at any time (quota, privacy modes). Every caller in this crate
//! treats marker operations as best-effort and discards the `Result`
//! with `let _ =`; a marker failure must never fail a login or a
//! registration.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

use pharma_direct_core::Uid;

use crate::models::session::{SessionMarker, marker_keys};

/// Error reading or writing local markers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarkerError {
    /// The storage medium refused the operation.
    #[error("marker storage unavailable: {0}")]
    Unavailable(String),
}

/// Key-value storage for session markers.
pub trait MarkerStore: Send + Sync {
    /// Store `value` under `key`, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::Unavailable`] if the medium refuses.
    fn set(&self, key: &str, value: &str) -> Result<(), MarkerError>;

    /// The value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::Unavailable`] if the medium refuses.
    fn get(&self, key: &str) -> Result<Option<String>, MarkerError>;

    /// Remove the value under `key`. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::Unavailable`] if the medium refuses.
    fn remove(&self, key: &str) -> Result<(), MarkerError>;

    /// Store both markers for a signed-in account.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::Unavailable`] if the medium refuses.
    fn remember(&self, marker: &SessionMarker) -> Result<(), MarkerError> {
        self.set(marker_keys::UID, marker.uid.as_str())?;
        self.set(marker_keys::ROLE, &marker.role.to_string())
    }

    /// Remove both markers.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::Unavailable`] if the medium refuses.
    fn forget(&self) -> Result<(), MarkerError> {
        self.remove(marker_keys::UID)?;
        self.remove(marker_keys::ROLE)
    }

    /// The cached marker pair, when both keys are present and the role
    /// parses. Anything else reads as no marker.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::Unavailable`] if the medium refuses.
    fn recall(&self) -> Result<Option<SessionMarker>, MarkerError> {
        let Some(uid) = self.get(marker_keys::UID)? else {
            return Ok(None);
        };
        let Some(role) = self.get(marker_keys::ROLE)? else {
            return Ok(None);
        };
        Ok(role.parse().ok().map(|role| SessionMarker {
            uid: Uid::new(uid),
            role,
        }))
    }
}

/// In-memory [`MarkerStore`] for tests and the CLI sandbox.
#[derive(Debug, Default)]
pub struct MemoryMarkerStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryMarkerStore {
    /// Create an empty marker store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarkerStore for MemoryMarkerStore {
    fn set(&self, key: &str, value: &str) -> Result<(), MarkerError> {
        let mut values = lock(&self.values)?;
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, MarkerError> {
        let values = lock(&self.values)?;
        Ok(values.get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<(), MarkerError> {
        let mut values = lock(&self.values)?;
        values.remove(key);
        Ok(())
    }
}

fn lock(
    values: &Mutex<HashMap<String, String>>,
) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, MarkerError> {
    values
        .lock()
        .map_err(|_| MarkerError::Unavailable("marker lock poisoned".to_owned()))
}
