//! Session workflow error types.

use thiserror::Error;

use crate::backend::{IdentityError, StoreError};

/// Errors that can occur during session workflows.
///
/// Two classes surface to callers: identity-provider failures, and
/// profile-store failures from registration's provisioning phase (after
/// rollback has already run). Best-effort work - local markers, the
/// role cache at login - never produces an error here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The identity provider rejected or failed the operation.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The profile store rejected or failed a provisioning write or a
    /// profile read.
    #[error(transparent)]
    Store(#[from] StoreError),
}
