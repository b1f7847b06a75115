//! In-memory backend implementations.
//!
//! Process-local [`IdentityProvider`] and [`ProfileStore`] used by the
//! test suites and the CLI sandbox. The provider hashes passwords with
//! Argon2id and keeps at most one current session; the store keeps
//! collections in `BTreeMap`s so queries come back in stable ID order.
//!
//! The store can enforce owner rules the way a hosted store's
//! server-side security rules would, which is what makes the pharmacy
//! permissions probe demonstrable offline.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use pharma_direct_core::{Email, Uid};

use super::identity::{
    AuthStateChange, AuthStateEvents, Identity, IdentityError, IdentityProvider,
};
use super::profile::{DocEntry, Document, ProfileStore, StoreError, WriteMode};

/// Minimum password length accepted by the in-memory provider.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Buffered auth-state events per subscriber.
const AUTH_EVENT_CAPACITY: usize = 64;

/// Read-only view of the current session, consulted by the in-memory
/// store when evaluating owner rules.
pub trait AuthContext: Send + Sync {
    /// UID of the current session, if one exists.
    fn current_uid(&self) -> Option<Uid>;
}

// =============================================================================
// Identity provider
// =============================================================================

struct StoredIdentity {
    uid: Uid,
    email: Email,
    password_hash: String,
    display_name: Option<String>,
}

impl StoredIdentity {
    fn to_identity(&self) -> Identity {
        Identity {
            uid: self.uid.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

struct AuthState {
    /// Accounts keyed by normalized email.
    accounts: BTreeMap<String, StoredIdentity>,
    /// Email key of the current session.
    current: Option<String>,
}

/// In-memory [`IdentityProvider`].
pub struct MemoryIdentityProvider {
    state: Mutex<AuthState>,
    events: broadcast::Sender<AuthStateChange>,
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIdentityProvider {
    /// Create an empty provider with no accounts and no session.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            state: Mutex::new(AuthState {
                accounts: BTreeMap::new(),
                current: None,
            }),
            events,
        }
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, AuthState>, IdentityError> {
        self.state
            .lock()
            .map_err(|_| IdentityError::Unavailable("auth state lock poisoned".to_owned()))
    }

    fn emit(&self, change: AuthStateChange) {
        // Nobody listening is fine.
        let _ = self.events.send(change);
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, IdentityError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let identity = {
            let mut state = self.lock_state()?;
            if state.accounts.contains_key(email.as_str()) {
                return Err(IdentityError::EmailInUse);
            }
            let stored = StoredIdentity {
                uid: Uid::generate(),
                email: email.clone(),
                password_hash,
                display_name: None,
            };
            let identity = stored.to_identity();
            state.accounts.insert(email.as_str().to_owned(), stored);
            state.current = Some(email.as_str().to_owned());
            identity
        };

        self.emit(AuthStateChange::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let email = Email::parse(email)?;

        let identity = {
            let mut state = self.lock_state()?;
            let stored = state
                .accounts
                .get(email.as_str())
                .ok_or(IdentityError::InvalidCredentials)?;
            verify_password(password, &stored.password_hash)?;
            let identity = stored.to_identity();
            state.current = Some(email.as_str().to_owned());
            identity
        };

        self.emit(AuthStateChange::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn update_display_name(
        &self,
        uid: &Uid,
        display_name: &str,
    ) -> Result<(), IdentityError> {
        let mut state = self.lock_state()?;
        let stored = state
            .accounts
            .values_mut()
            .find(|stored| stored.uid == *uid)
            .ok_or(IdentityError::IdentityNotFound)?;
        stored.display_name = Some(display_name.to_owned());
        Ok(())
    }

    async fn delete_identity(&self, uid: &Uid) -> Result<(), IdentityError> {
        {
            let mut state = self.lock_state()?;
            let current_email = state
                .current
                .clone()
                .ok_or(IdentityError::RequiresRecentLogin)?;
            let is_current = state
                .accounts
                .get(&current_email)
                .is_some_and(|stored| stored.uid == *uid);
            if !is_current {
                return Err(IdentityError::RequiresRecentLogin);
            }
            state.accounts.remove(&current_email);
            state.current = None;
        }

        self.emit(AuthStateChange::SignedOut);
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let had_session = self.lock_state()?.current.take().is_some();
        if had_session {
            self.emit(AuthStateChange::SignedOut);
        }
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        let state = self.state.lock().ok()?;
        let email = state.current.as_ref()?;
        state.accounts.get(email).map(StoredIdentity::to_identity)
    }

    fn subscribe(&self) -> AuthStateEvents {
        self.events.subscribe()
    }
}

impl AuthContext for MemoryIdentityProvider {
    fn current_uid(&self) -> Option<Uid> {
        self.current_identity().map(|identity| identity.uid)
    }
}

/// Validate a password against the provider's policy.
fn validate_password(password: &str) -> Result<(), IdentityError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(IdentityError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| IdentityError::Unavailable("password hashing failed".to_owned()))
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), IdentityError> {
    let parsed = PasswordHash::new(hash).map_err(|_| IdentityError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| IdentityError::InvalidCredentials)
}

// =============================================================================
// Profile store
// =============================================================================

/// Restricts writes in one collection to the identity named by one of
/// the document's own fields.
///
/// Mirrors the hosted store's rule for product listings: only the
/// pharmacy whose UID matches the document's `pharmacyId` may write it.
/// Creates check the incoming fields, updates check the stored ones.
#[derive(Debug, Clone)]
pub struct OwnerWriteRule {
    collection: String,
    field: String,
}

impl OwnerWriteRule {
    /// Rule guarding `collection`, with the owner UID read from `field`.
    #[must_use]
    pub fn new(collection: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            field: field.into(),
        }
    }
}

/// In-memory [`ProfileStore`].
pub struct MemoryProfileStore {
    data: Mutex<BTreeMap<String, BTreeMap<String, Document>>>,
    auth: Option<Arc<dyn AuthContext>>,
    rules: Vec<OwnerWriteRule>,
}

impl Default for MemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProfileStore {
    /// Create an empty store with no security rules.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Mutex::new(BTreeMap::new()),
            auth: None,
            rules: Vec::new(),
        }
    }

    /// Create an empty store enforcing the given owner rules, resolving
    /// the current session through `auth`.
    #[must_use]
    pub fn with_rules(auth: Arc<dyn AuthContext>, rules: Vec<OwnerWriteRule>) -> Self {
        Self {
            data: Mutex::new(BTreeMap::new()),
            auth: Some(auth),
            rules,
        }
    }

    fn lock_data(
        &self,
    ) -> Result<MutexGuard<'_, BTreeMap<String, BTreeMap<String, Document>>>, StoreError> {
        self.data
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_owned()))
    }

    /// Evaluate the owner rule for a write, if the collection has one.
    fn authorize_write(
        &self,
        collection: &str,
        incoming: &Document,
        existing: Option<&Document>,
    ) -> Result<(), StoreError> {
        let Some(rule) = self.rules.iter().find(|r| r.collection == collection) else {
            return Ok(());
        };

        let uid = self.auth.as_ref().and_then(|auth| auth.current_uid());
        let Some(uid) = uid else {
            return Err(permission_denied());
        };

        let owner = match existing {
            Some(doc) => doc.get(&rule.field),
            None => incoming.get(&rule.field),
        };
        if owner.and_then(Value::as_str) == Some(uid.as_str()) {
            Ok(())
        } else {
            Err(permission_denied())
        }
    }
}

/// The denial as the hosted store words it.
fn permission_denied() -> StoreError {
    StoreError::PermissionDenied {
        message: "Missing or insufficient permissions.".to_owned(),
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let data = self.lock_data()?;
        Ok(data
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        let mut data = self.lock_data()?;
        let existing = data.get(collection).and_then(|docs| docs.get(id));
        self.authorize_write(collection, &fields, existing)?;

        let docs = data.entry(collection.to_owned()).or_default();
        match mode {
            WriteMode::Overwrite => {
                docs.insert(id.to_owned(), fields);
            }
            WriteMode::Merge => {
                let doc = docs.entry(id.to_owned()).or_default();
                for (key, value) in fields {
                    doc.insert(key, value);
                }
            }
        }
        Ok(())
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        limit: Option<usize>,
    ) -> Result<Vec<DocEntry>, StoreError> {
        let data = self.lock_data()?;
        let Some(docs) = data.get(collection) else {
            return Ok(Vec::new());
        };

        let matches = docs
            .iter()
            .filter(|(_, fields)| fields.get(field) == Some(value))
            .take(limit.unwrap_or(usize::MAX))
            .map(|(id, fields)| DocEntry {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect();
        Ok(matches)
    }
}
