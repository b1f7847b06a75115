//! Session establishment service.
//!
//! Registration, login, logout, and profile reads against the identity
//! provider and the profile store. Registration is the one multi-step
//! workflow: identity creation, then profile provisioning, with a
//! compensating rollback when provisioning fails partway - the email
//! must not end up permanently claimed by an account that has no
//! profile documents.

mod error;

pub use error::SessionError;

use std::sync::Arc;

use chrono::Utc;

use pharma_direct_core::{Role, Uid};

use crate::backend::{
    Identity, IdentityProvider, ProfileStore, WriteMode, collections, decode, encode,
};
use crate::marker::MarkerStore;
use crate::models::account::{PharmacyProfile, Registration, UserAccount};
use crate::models::session::SessionMarker;

/// Session establishment service.
///
/// Cheap to clone; the collaborators are shared.
#[derive(Clone)]
pub struct SessionService {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    markers: Arc<dyn MarkerStore>,
}

impl SessionService {
    /// Create a session service over the given collaborators.
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        markers: Arc<dyn MarkerStore>,
    ) -> Self {
        Self {
            identity,
            profiles,
            markers,
        }
    }

    /// Register a new account.
    ///
    /// Creates the identity (which signs it in), sets its display name,
    /// and writes the profile documents: a `users` document for every
    /// account, plus a merged `pharmacies` document for pharmacy
    /// registrations. On success the session markers are cached
    /// best-effort and the new identity is returned, still signed in.
    ///
    /// If any step after identity creation fails, the identity is
    /// rolled back - deleted, or signed out when deletion itself fails -
    /// and the step's own error is returned. Rollback failures are
    /// logged, never surfaced.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Identity`] if the provider rejects the
    /// credentials or fails, [`SessionError::Store`] if provisioning
    /// fails (after rollback).
    pub async fn register(&self, registration: Registration) -> Result<Identity, SessionError> {
        let identity = self
            .identity
            .create_identity(&registration.email, &registration.password)
            .await?;

        match self.provision(&identity, &registration).await {
            Ok(()) => {
                let _ = self.markers.remember(&SessionMarker {
                    uid: identity.uid.clone(),
                    role: registration.role,
                });
                tracing::info!(uid = %identity.uid, role = %registration.role, "account registered");
                Ok(identity)
            }
            Err(err) => {
                self.roll_back(&identity).await;
                Err(err)
            }
        }
    }

    /// The provisioning phase of registration.
    async fn provision(
        &self,
        identity: &Identity,
        registration: &Registration,
    ) -> Result<(), SessionError> {
        self.identity
            .update_display_name(&identity.uid, &registration.name)
            .await?;

        let account = UserAccount::at_registration(
            &registration.name,
            &identity.email,
            registration.phone.as_deref(),
            registration.role,
            Utc::now().timestamp_millis(),
        );
        self.profiles
            .set(
                collections::USERS,
                identity.uid.as_str(),
                encode(&account)?,
                WriteMode::Overwrite,
            )
            .await?;

        if registration.role == Role::Pharmacy {
            let profile = PharmacyProfile::at_registration(
                &registration.name,
                &identity.email,
                registration.phone.as_deref(),
            );
            // Merge, so fields added by approval tooling survive.
            self.profiles
                .set(
                    collections::PHARMACIES,
                    identity.uid.as_str(),
                    encode(&profile)?,
                    WriteMode::Merge,
                )
                .await?;
        }

        Ok(())
    }

    /// Roll back a half-provisioned identity: delete it, falling back
    /// to a plain sign-out when deletion fails. Rollback failures are
    /// logged and swallowed so they can never mask the provisioning
    /// error the caller is about to see.
    async fn roll_back(&self, identity: &Identity) {
        if let Err(delete_err) = self.identity.delete_identity(&identity.uid).await {
            tracing::warn!(
                uid = %identity.uid,
                error = %delete_err,
                "rollback could not delete the identity; signing out instead"
            );
            if let Err(sign_out_err) = self.identity.sign_out().await {
                tracing::warn!(
                    uid = %identity.uid,
                    error = %sign_out_err,
                    "rollback sign-out failed; a session may remain"
                );
            }
        }
    }

    /// Authenticate an existing account.
    ///
    /// On success the account's role is read and the session markers
    /// are cached, both best-effort: a store or marker failure leaves
    /// the login successful with no markers written.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Identity`] if authentication fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        let identity = self.identity.authenticate(email, password).await?;

        match self.fetch_user_role(&identity.uid).await {
            Ok(role) => {
                let _ = self.markers.remember(&SessionMarker {
                    uid: identity.uid.clone(),
                    role,
                });
            }
            Err(err) => {
                tracing::debug!(
                    uid = %identity.uid,
                    error = %err,
                    "role fetch failed; leaving session markers unset"
                );
            }
        }

        tracing::info!(uid = %identity.uid, "signed in");
        Ok(identity)
    }

    /// End the current session, clearing local markers first.
    ///
    /// Marker clearing is best-effort; sign-out proceeds regardless.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Identity`] if the provider fails to sign
    /// out.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let _ = self.markers.forget();
        self.identity.sign_out().await?;
        Ok(())
    }

    /// The role recorded on an account's user document.
    ///
    /// A missing document (or an unset role field) reads as the default
    /// customer role; absence is an implicit default identity, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store fails or refuses
    /// the read.
    pub async fn fetch_user_role(&self, uid: &Uid) -> Result<Role, SessionError> {
        let account = self.fetch_user_doc(uid).await?;
        Ok(account.map_or(Role::User, |account| account.role))
    }

    /// An account's full user document, or `None` when it has none.
    ///
    /// Callers branch on presence before reading `disabled` or `role`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store fails, refuses the
    /// read, or holds a document that does not decode.
    pub async fn fetch_user_doc(&self, uid: &Uid) -> Result<Option<UserAccount>, SessionError> {
        match self.profiles.get(collections::USERS, uid.as_str()).await? {
            Some(fields) => Ok(Some(decode(fields)?)),
            None => Ok(None),
        }
    }

    /// Subscribe to the identity provider's auth-state stream.
    #[must_use]
    pub fn auth_events(&self) -> crate::backend::AuthStateEvents {
        self.identity.subscribe()
    }

    /// The identity of the current session, if any.
    #[must_use]
    pub fn current_identity(&self) -> Option<Identity> {
        self.identity.current_identity()
    }
}
