//! Registration workflow tests.
//!
//! Covers the documents a new account lands with, per role, and the
//! rollback paths: a provisioning failure must delete the identity
//! (falling back to a sign-out when deletion is refused) and surface
//! the provisioning error itself, never a rollback error.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use pharma_direct_auth::backend::{
    AuthStateChange, IdentityError, IdentityProvider, MemoryIdentityProvider, MemoryProfileStore,
    ProfileStore, StoreError, collections, decode,
};
use pharma_direct_auth::marker::{MarkerStore, MemoryMarkerStore};
use pharma_direct_auth::models::{PharmacyProfile, Registration, UserAccount, marker_keys};
use pharma_direct_auth::services::session::{SessionError, SessionService};
use pharma_direct_core::{Peso, Role};
use pharma_direct_integration_tests::{
    DenyDeleteProvider, FailingCollectionStore, RefusingMarkerStore, TestEnv,
};

// ============================================================================
// Provisioning
// ============================================================================

#[tokio::test]
async fn customer_registration_provisions_a_user_document() {
    let env = TestEnv::new();

    let identity = env
        .service
        .register(Registration::new(
            "Maria Santos",
            "Maria@Example.com",
            "secret-1",
        ))
        .await
        .unwrap();

    // The provider normalizes the email and keeps the session open.
    assert_eq!(identity.email.as_str(), "maria@example.com");
    let current = env.identity.current_identity().unwrap();
    assert_eq!(current.uid, identity.uid);
    assert_eq!(current.display_name.as_deref(), Some("Maria Santos"));

    let fields = env
        .profiles
        .get(collections::USERS, identity.uid.as_str())
        .await
        .unwrap()
        .unwrap();
    let account: UserAccount = decode(fields).unwrap();
    assert_eq!(account.name, "Maria Santos");
    assert_eq!(account.email, "maria@example.com");
    assert_eq!(account.role, Role::User);
    assert!(!account.disabled);
    assert!(!account.cod_unlocked);
    assert_eq!(account.successful_orders, 0);
    assert_eq!(account.total_spent, Peso::ZERO);
    assert!(account.created_at > 0);

    // Customers get no pharmacy profile.
    assert_eq!(
        env.profiles
            .get(collections::PHARMACIES, identity.uid.as_str())
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn pharmacy_registration_adds_the_pharmacy_profile() {
    let env = TestEnv::new();

    let identity = env
        .service
        .register(
            Registration::new("Mercury Drug", "ops@mercury.ph", "secret-1")
                .with_phone("+63 917 555 0100")
                .with_role(Role::Pharmacy),
        )
        .await
        .unwrap();

    let fields = env
        .profiles
        .get(collections::USERS, identity.uid.as_str())
        .await
        .unwrap()
        .unwrap();
    let account: UserAccount = decode(fields).unwrap();
    assert_eq!(account.role, Role::Pharmacy);
    assert_eq!(account.phone, "+63 917 555 0100");
    assert!(!account.cod_unlocked);

    let fields = env
        .profiles
        .get(collections::PHARMACIES, identity.uid.as_str())
        .await
        .unwrap()
        .unwrap();
    let profile: PharmacyProfile = decode(fields).unwrap();
    assert_eq!(profile.name, "Mercury Drug");
    assert_eq!(profile.email, "ops@mercury.ph");
    assert!(!profile.approved);
    assert!(profile.products.is_empty());
    assert_eq!(profile.total_orders, 0);
}

#[tokio::test]
async fn admin_registration_unlocks_cash_on_delivery() {
    let env = TestEnv::new();

    let identity = env
        .service
        .register(
            Registration::new("Site Admin", "admin@pharma-direct.ph", "secret-1")
                .with_role(Role::Admin),
        )
        .await
        .unwrap();

    let fields = env
        .profiles
        .get(collections::USERS, identity.uid.as_str())
        .await
        .unwrap()
        .unwrap();
    let account: UserAccount = decode(fields).unwrap();
    assert_eq!(account.role, Role::Admin);
    assert!(account.cod_unlocked);

    assert_eq!(
        env.profiles
            .get(collections::PHARMACIES, identity.uid.as_str())
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn registration_caches_the_session_markers() {
    let env = TestEnv::new();

    let identity = env
        .service
        .register(
            Registration::new("Mercury Drug", "ops@mercury.ph", "secret-1")
                .with_role(Role::Pharmacy),
        )
        .await
        .unwrap();

    assert_eq!(
        env.markers.get(marker_keys::UID).unwrap().as_deref(),
        Some(identity.uid.as_str())
    );
    assert_eq!(
        env.markers.get(marker_keys::ROLE).unwrap().as_deref(),
        Some("pharmacy")
    );
}

// ============================================================================
// Failures before provisioning
// ============================================================================

#[tokio::test]
async fn duplicate_email_fails_and_leaves_the_first_account_alone() {
    let env = TestEnv::new();
    let first = env
        .service
        .register(Registration::new("Maria", "maria@example.com", "secret-1"))
        .await
        .unwrap();

    let err = env
        .service
        .register(Registration::new(
            "Impostor",
            "maria@example.com",
            "other-password",
        ))
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::Identity(IdentityError::EmailInUse));

    // The losing attempt must not have touched the winner's state.
    assert_eq!(
        env.identity.current_identity().map(|id| id.uid),
        Some(first.uid.clone())
    );
    let fields = env
        .profiles
        .get(collections::USERS, first.uid.as_str())
        .await
        .unwrap()
        .unwrap();
    let account: UserAccount = decode(fields).unwrap();
    assert_eq!(account.name, "Maria");
}

#[tokio::test]
async fn weak_password_fails_before_any_side_effects() {
    let env = TestEnv::new();

    let err = env
        .service
        .register(Registration::new("Maria", "maria@example.com", "12345"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Identity(IdentityError::WeakPassword(_))
    ));

    assert!(env.identity.current_identity().is_none());
    assert_eq!(env.markers.get(marker_keys::UID).unwrap(), None);
}

// ============================================================================
// Rollback
// ============================================================================

#[tokio::test]
async fn users_write_failure_rolls_the_identity_back() {
    let env = TestEnv::with_profiles(Arc::new(FailingCollectionStore::failing_writes(
        collections::USERS,
    )));

    let err = env
        .service
        .register(Registration::new("Maria", "maria@example.com", "secret-1"))
        .await
        .unwrap_err();
    // The provisioning error is what surfaces, not a rollback error.
    assert!(matches!(
        err,
        SessionError::Store(StoreError::Unavailable(_))
    ));

    // The identity was deleted: no session, no credentials, and the
    // email is free to claim again.
    assert!(env.identity.current_identity().is_none());
    assert_eq!(
        env.identity
            .authenticate("maria@example.com", "secret-1")
            .await
            .unwrap_err(),
        IdentityError::InvalidCredentials
    );
    env.identity
        .create_identity("maria@example.com", "secret-1")
        .await
        .unwrap();

    assert_eq!(env.markers.get(marker_keys::UID).unwrap(), None);
}

#[tokio::test]
async fn pharmacy_write_failure_rolls_back_the_identity_only() {
    let env = TestEnv::with_profiles(Arc::new(FailingCollectionStore::failing_writes(
        collections::PHARMACIES,
    )));
    let mut events = env.identity.subscribe();

    let err = env
        .service
        .register(
            Registration::new("Mercury Drug", "ops@mercury.ph", "secret-1")
                .with_role(Role::Pharmacy),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Store(StoreError::Unavailable(_))
    ));

    // The attempt signed in and back out.
    let AuthStateChange::SignedIn(identity) = events.recv().await.unwrap() else {
        panic!("expected a sign-in event first");
    };
    assert!(matches!(
        events.recv().await.unwrap(),
        AuthStateChange::SignedOut
    ));
    assert!(env.identity.current_identity().is_none());

    // Rollback compensates the identity, not the documents: the users
    // write that had already succeeded stays behind.
    assert!(
        env.profiles
            .get(collections::USERS, identity.uid.as_str())
            .await
            .unwrap()
            .is_some()
    );
    assert_eq!(
        env.profiles
            .get(collections::PHARMACIES, identity.uid.as_str())
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn rollback_falls_back_to_sign_out_when_deletion_is_refused() {
    let inner = Arc::new(MemoryIdentityProvider::new());
    let service = SessionService::new(
        Arc::new(DenyDeleteProvider::new(inner.clone())),
        Arc::new(FailingCollectionStore::failing_writes(collections::USERS)),
        Arc::new(MemoryMarkerStore::new()),
    );

    let err = service
        .register(Registration::new("Maria", "maria@example.com", "secret-1"))
        .await
        .unwrap_err();
    // Still the provisioning error, even though rollback also failed.
    assert!(matches!(
        err,
        SessionError::Store(StoreError::Unavailable(_))
    ));

    // Deletion was refused, so the fallback signed the session out...
    assert!(inner.current_identity().is_none());
    // ...and the identity survived with its credentials intact.
    inner
        .authenticate("maria@example.com", "secret-1")
        .await
        .unwrap();
}

// ============================================================================
// Marker storage failures
// ============================================================================

#[tokio::test]
async fn marker_failure_never_fails_registration() {
    let identity_provider = Arc::new(MemoryIdentityProvider::new());
    let service = SessionService::new(
        identity_provider.clone(),
        Arc::new(MemoryProfileStore::new()),
        Arc::new(RefusingMarkerStore),
    );

    let identity = service
        .register(Registration::new("Maria", "maria@example.com", "secret-1"))
        .await
        .unwrap();

    assert_eq!(
        identity_provider.current_identity().map(|id| id.uid),
        Some(identity.uid)
    );
}
