//! Integration tests for the Pharma Direct session workflows.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pharma-direct-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `registration` - the registration workflow and its rollback
//! - `login_logout` - login, logout, and the session markers
//! - `watcher` - auth-state watching and role-based routing
//! - `probe` - the pharmacy permissions probe
//!
//! [`TestEnv`] wires the in-memory backends to the real service. The
//! wrapper types below break one collaborator at a time, so individual
//! scenarios can exercise the failure paths end to end.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use pharma_direct_auth::backend::{
    AuthContext, AuthStateEvents, DocEntry, Document, Identity, IdentityError, IdentityProvider,
    MemoryIdentityProvider, MemoryProfileStore, OwnerWriteRule, ProfileStore, StoreError,
    WriteMode, collections, encode,
};
use pharma_direct_auth::marker::{MarkerError, MarkerStore, MemoryMarkerStore};
use pharma_direct_auth::models::UserAccount;
use pharma_direct_auth::redirect::RecordingNavigator;
use pharma_direct_auth::services::session::SessionService;
use pharma_direct_auth::watch::{WatchHandle, watch_auth_and_redirect};
use pharma_direct_core::Uid;

// ============================================================================
// Test environment
// ============================================================================

/// A fully wired environment over the in-memory backends.
///
/// The identity provider is held concretely so tests can drive it
/// directly; the profile store is held behind the trait so scenarios
/// can substitute a failing one.
pub struct TestEnv {
    pub identity: Arc<MemoryIdentityProvider>,
    pub profiles: Arc<dyn ProfileStore>,
    pub markers: Arc<MemoryMarkerStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub service: SessionService,
}

impl TestEnv {
    /// An environment whose store accepts every write.
    #[must_use]
    pub fn new() -> Self {
        Self::assemble(
            Arc::new(MemoryIdentityProvider::new()),
            Arc::new(MemoryProfileStore::new()),
        )
    }

    /// An environment whose store enforces the products owner rule,
    /// the way the hosted store's security rules do.
    #[must_use]
    pub fn with_product_owner_rule() -> Self {
        let identity = Arc::new(MemoryIdentityProvider::new());
        let auth: Arc<dyn AuthContext> = identity.clone();
        let profiles = Arc::new(MemoryProfileStore::with_rules(
            auth,
            vec![OwnerWriteRule::new(collections::PRODUCTS, "pharmacyId")],
        ));
        Self::assemble(identity, profiles)
    }

    /// An environment over a caller-supplied profile store.
    #[must_use]
    pub fn with_profiles(profiles: Arc<dyn ProfileStore>) -> Self {
        Self::assemble(Arc::new(MemoryIdentityProvider::new()), profiles)
    }

    fn assemble(identity: Arc<MemoryIdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        let markers = Arc::new(MemoryMarkerStore::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let service = SessionService::new(identity.clone(), profiles.clone(), markers.clone());
        Self {
            identity,
            profiles,
            markers,
            navigator,
            service,
        }
    }

    /// Start the auth watcher, routing through this environment's
    /// recording navigator.
    #[must_use]
    pub fn start_watcher(&self) -> WatchHandle {
        watch_auth_and_redirect(self.service.clone(), self.navigator.clone())
    }

    /// Write a user document directly, bypassing registration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store refuses the write or the
    /// account does not encode.
    pub async fn seed_account_doc(
        &self,
        uid: &Uid,
        account: &UserAccount,
    ) -> Result<(), StoreError> {
        self.profiles
            .set(
                collections::USERS,
                uid.as_str(),
                encode(account)?,
                WriteMode::Overwrite,
            )
            .await
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Polling
// ============================================================================

/// Poll until `condition` holds.
///
/// # Panics
///
/// Panics after about a second, so a watcher that never routes fails
/// the test instead of wedging it.
pub async fn eventually(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within the deadline");
}

// ============================================================================
// Failure-injection wrappers
// ============================================================================

/// Identity provider that delegates everything except deletion, which
/// it refuses. Forces registration rollback onto its sign-out fallback.
pub struct DenyDeleteProvider {
    inner: Arc<MemoryIdentityProvider>,
}

impl DenyDeleteProvider {
    #[must_use]
    pub fn new(inner: Arc<MemoryIdentityProvider>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl IdentityProvider for DenyDeleteProvider {
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, IdentityError> {
        self.inner.create_identity(email, password).await
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        self.inner.authenticate(email, password).await
    }

    async fn update_display_name(
        &self,
        uid: &Uid,
        display_name: &str,
    ) -> Result<(), IdentityError> {
        self.inner.update_display_name(uid, display_name).await
    }

    async fn delete_identity(&self, _uid: &Uid) -> Result<(), IdentityError> {
        Err(IdentityError::RequiresRecentLogin)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.inner.sign_out().await
    }

    fn current_identity(&self) -> Option<Identity> {
        self.inner.current_identity()
    }

    fn subscribe(&self) -> AuthStateEvents {
        self.inner.subscribe()
    }
}

/// Profile store that fails every operation of one kind against one
/// collection, simulating an outage scoped to it. Everything else
/// passes through to a fresh in-memory store.
pub struct FailingCollectionStore {
    inner: MemoryProfileStore,
    collection: String,
    fail_reads: bool,
    fail_writes: bool,
}

impl FailingCollectionStore {
    /// Fail all writes to `collection`; reads pass through.
    #[must_use]
    pub fn failing_writes(collection: &str) -> Self {
        Self {
            inner: MemoryProfileStore::new(),
            collection: collection.to_owned(),
            fail_reads: false,
            fail_writes: true,
        }
    }

    /// Fail all reads from `collection`; writes pass through.
    #[must_use]
    pub fn failing_reads(collection: &str) -> Self {
        Self {
            inner: MemoryProfileStore::new(),
            collection: collection.to_owned(),
            fail_reads: true,
            fail_writes: false,
        }
    }

    fn outage(&self) -> StoreError {
        StoreError::Unavailable(format!("simulated outage on '{}'", self.collection))
    }
}

#[async_trait]
impl ProfileStore for FailingCollectionStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        if self.fail_reads && collection == self.collection {
            return Err(self.outage());
        }
        self.inner.get(collection, id).await
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        if self.fail_writes && collection == self.collection {
            return Err(self.outage());
        }
        self.inner.set(collection, id, fields, mode).await
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        limit: Option<usize>,
    ) -> Result<Vec<DocEntry>, StoreError> {
        if self.fail_reads && collection == self.collection {
            return Err(self.outage());
        }
        self.inner.query_eq(collection, field, value, limit).await
    }
}

/// Marker store that refuses every operation, like a browser with local
/// storage disabled.
#[derive(Debug, Default)]
pub struct RefusingMarkerStore;

impl RefusingMarkerStore {
    fn refuse<T>() -> Result<T, MarkerError> {
        Err(MarkerError::Unavailable(
            "marker storage disabled".to_owned(),
        ))
    }
}

impl MarkerStore for RefusingMarkerStore {
    fn set(&self, _key: &str, _value: &str) -> Result<(), MarkerError> {
        Self::refuse()
    }

    fn get(&self, _key: &str) -> Result<Option<String>, MarkerError> {
        Self::refuse()
    }

    fn remove(&self, _key: &str) -> Result<(), MarkerError> {
        Self::refuse()
    }
}
