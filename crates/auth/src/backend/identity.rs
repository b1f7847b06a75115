//! Identity provider abstraction.
//!
//! Credentials, the current session, and the auth-state event stream
//! live behind [`IdentityProvider`]. The provider owns email and
//! password policy; callers hand over raw strings and surface whatever
//! the provider rejects.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use pharma_direct_core::{Email, EmailError, Uid};

/// Errors reported by an identity provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The email is already registered to another identity.
    #[error("email already in use")]
    EmailInUse,

    /// Malformed email address.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password rejected by the provider's policy.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Wrong email/password combination.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No identity exists for the given UID.
    #[error("identity not found")]
    IdentityNotFound,

    /// Destructive operations require a freshly authenticated session.
    #[error("operation requires a recent login")]
    RequiresRecentLogin,

    /// The provider could not be reached or failed internally.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// An authenticated identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider-assigned unique ID.
    pub uid: Uid,
    /// Email the identity was registered with, provider-normalized.
    pub email: Email,
    /// Display name, once one has been set.
    pub display_name: Option<String>,
}

/// One auth-state transition.
///
/// Emitted on every sign-in, sign-out, and session restore. Consumers
/// joining late see only transitions from their subscription onwards.
#[derive(Debug, Clone)]
pub enum AuthStateChange {
    /// An identity became the current session.
    SignedIn(Identity),
    /// The current session ended.
    SignedOut,
}

/// Receiving end of the auth-state event stream.
pub type AuthStateEvents = broadcast::Receiver<AuthStateChange>;

/// Account credentials and session state.
///
/// Implementations are expected to keep at most one current session per
/// process, mirroring how a client SDK behaves in a browser tab.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a new identity and make it the current session.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::EmailInUse`] if the email is taken,
    /// [`IdentityError::InvalidEmail`] or [`IdentityError::WeakPassword`]
    /// if the credentials fail the provider's policy.
    async fn create_identity(&self, email: &str, password: &str)
    -> Result<Identity, IdentityError>;

    /// Authenticate an existing identity and make it the current session.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidCredentials`] for a wrong email or
    /// password. Which of the two was wrong is deliberately not revealed.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, IdentityError>;

    /// Set the display name on an existing identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::IdentityNotFound`] if no identity has
    /// the given UID.
    async fn update_display_name(&self, uid: &Uid, display_name: &str)
    -> Result<(), IdentityError>;

    /// Permanently delete an identity and end its session.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::RequiresRecentLogin`] when the identity
    /// is not the freshly authenticated current session.
    async fn delete_identity(&self, uid: &Uid) -> Result<(), IdentityError>;

    /// End the current session. Signing out without a session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Unavailable`] if the provider fails.
    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// The identity of the current session, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Subscribe to auth-state transitions.
    fn subscribe(&self) -> AuthStateEvents;
}
