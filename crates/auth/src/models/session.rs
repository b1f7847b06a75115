//! Session marker types.
//!
//! The small pieces of identity cached on the client between page
//! loads. Markers are a convenience, never an authority: the identity
//! provider and the profile store can re-derive everything here, so
//! workflows write and clear markers best-effort.

use serde::{Deserialize, Serialize};

use pharma_direct_core::{Role, Uid};

/// Locally cached session identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMarker {
    /// UID of the signed-in account.
    pub uid: Uid,
    /// Role recorded at sign-in time. May go stale; authoritative role
    /// checks re-read the user document.
    pub role: Role,
}

/// Storage keys for session markers.
pub mod marker_keys {
    /// Key for the cached UID.
    pub const UID: &str = "uid";

    /// Key for the cached role.
    pub const ROLE: &str = "role";
}
