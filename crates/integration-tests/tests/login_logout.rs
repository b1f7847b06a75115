//! Login and logout tests.
//!
//! Login authenticates and then caches the session markers from the
//! account's user document, best-effort: a failed role fetch or a
//! refusing marker store still leaves the login successful. Logout
//! clears the markers before ending the session.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use serde_json::json;

use pharma_direct_auth::backend::{
    Document, IdentityError, IdentityProvider, MemoryIdentityProvider, MemoryProfileStore,
    ProfileStore, StoreError, WriteMode, collections,
};
use pharma_direct_auth::marker::MarkerStore;
use pharma_direct_auth::models::{Registration, SessionMarker, UserAccount, marker_keys};
use pharma_direct_auth::services::session::{SessionError, SessionService};
use pharma_direct_core::{Role, Uid};
use pharma_direct_integration_tests::{FailingCollectionStore, RefusingMarkerStore, TestEnv};

// ============================================================================
// Markers
// ============================================================================

#[tokio::test]
async fn login_caches_the_uid_and_role_markers() {
    let env = TestEnv::new();
    env.service
        .register(
            Registration::new("Mercury Drug", "ops@mercury.ph", "secret-1")
                .with_role(Role::Pharmacy),
        )
        .await
        .unwrap();
    env.service.logout().await.unwrap();
    assert_eq!(env.markers.get(marker_keys::UID).unwrap(), None);

    let identity = env
        .service
        .login("ops@mercury.ph", "secret-1")
        .await
        .unwrap();

    // The cached role comes from the user document, not the login form.
    assert_eq!(
        env.markers.recall().unwrap(),
        Some(SessionMarker {
            uid: identity.uid.clone(),
            role: Role::Pharmacy,
        })
    );
    assert_eq!(
        env.identity.current_identity().map(|id| id.uid),
        Some(identity.uid)
    );
}

#[tokio::test]
async fn wrong_password_leaves_no_session_or_markers() {
    let env = TestEnv::new();
    env.service
        .register(Registration::new("Maria", "maria@example.com", "secret-1"))
        .await
        .unwrap();
    env.service.logout().await.unwrap();

    let err = env
        .service
        .login("maria@example.com", "not-the-password")
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::Identity(IdentityError::InvalidCredentials));

    assert!(env.identity.current_identity().is_none());
    assert_eq!(env.markers.get(marker_keys::UID).unwrap(), None);
}

#[tokio::test]
async fn login_survives_a_role_fetch_outage() {
    let env = TestEnv::with_profiles(Arc::new(FailingCollectionStore::failing_reads(
        collections::USERS,
    )));
    env.service
        .register(Registration::new("Maria", "maria@example.com", "secret-1"))
        .await
        .unwrap();
    env.service.logout().await.unwrap();

    // Authentication works; only the role fetch fails.
    env.service
        .login("maria@example.com", "secret-1")
        .await
        .unwrap();

    assert!(env.identity.current_identity().is_some());
    assert_eq!(env.markers.get(marker_keys::UID).unwrap(), None);
    assert_eq!(env.markers.get(marker_keys::ROLE).unwrap(), None);
}

#[tokio::test]
async fn marker_failure_never_fails_login() {
    let identity_provider = Arc::new(MemoryIdentityProvider::new());
    let service = SessionService::new(
        identity_provider.clone(),
        Arc::new(MemoryProfileStore::new()),
        Arc::new(RefusingMarkerStore),
    );
    service
        .register(Registration::new("Maria", "maria@example.com", "secret-1"))
        .await
        .unwrap();
    service.logout().await.unwrap();

    service.login("maria@example.com", "secret-1").await.unwrap();
    assert!(identity_provider.current_identity().is_some());
}

#[tokio::test]
async fn logout_clears_the_markers_and_the_session() {
    let env = TestEnv::new();
    env.service
        .register(Registration::new("Maria", "maria@example.com", "secret-1"))
        .await
        .unwrap();
    assert!(env.markers.get(marker_keys::UID).unwrap().is_some());

    env.service.logout().await.unwrap();

    assert_eq!(env.markers.get(marker_keys::UID).unwrap(), None);
    assert_eq!(env.markers.get(marker_keys::ROLE).unwrap(), None);
    assert!(env.identity.current_identity().is_none());
}

// ============================================================================
// Role reads
// ============================================================================

#[tokio::test]
async fn missing_document_reads_as_the_default_role() {
    let env = TestEnv::new();
    let role = env
        .service
        .fetch_user_role(&Uid::new("nobody-here"))
        .await
        .unwrap();
    assert_eq!(role, Role::User);
}

#[tokio::test]
async fn login_caches_the_role_recorded_on_the_document() {
    let env = TestEnv::new();
    let identity = env
        .identity
        .create_identity("root@pharma-direct.ph", "secret-1")
        .await
        .unwrap();
    env.seed_account_doc(
        &identity.uid,
        &UserAccount::at_registration("Root", &identity.email, None, Role::Admin, 1_700_000_000_000),
    )
    .await
    .unwrap();
    env.identity.sign_out().await.unwrap();

    env.service
        .login("root@pharma-direct.ph", "secret-1")
        .await
        .unwrap();

    assert_eq!(
        env.service.fetch_user_role(&identity.uid).await.unwrap(),
        Role::Admin
    );
    assert_eq!(
        env.markers.get(marker_keys::ROLE).unwrap().as_deref(),
        Some("admin")
    );
}

#[tokio::test]
async fn an_unset_role_field_reads_as_a_customer() {
    let env = TestEnv::new();

    // Documents written before the role field existed carry "".
    let mut doc = Document::new();
    doc.insert("name".to_owned(), json!("Old Account"));
    doc.insert("role".to_owned(), json!(""));
    env.profiles
        .set(collections::USERS, "legacy-1", doc, WriteMode::Overwrite)
        .await
        .unwrap();

    let role = env
        .service
        .fetch_user_role(&Uid::new("legacy-1"))
        .await
        .unwrap();
    assert_eq!(role, Role::User);
}

#[tokio::test]
async fn an_unrecognized_role_is_not_a_customer() {
    let env = TestEnv::new();

    let mut doc = Document::new();
    doc.insert("role".to_owned(), json!("moderator"));
    env.profiles
        .set(collections::USERS, "mystery-1", doc, WriteMode::Overwrite)
        .await
        .unwrap();

    let role = env
        .service
        .fetch_user_role(&Uid::new("mystery-1"))
        .await
        .unwrap();
    assert_eq!(role, Role::Unknown);
}

#[tokio::test]
async fn a_garbled_document_surfaces_as_data_loss() {
    let env = TestEnv::new();

    let mut doc = Document::new();
    doc.insert("role".to_owned(), json!(7));
    env.profiles
        .set(collections::USERS, "garbled-1", doc, WriteMode::Overwrite)
        .await
        .unwrap();

    let err = env
        .service
        .fetch_user_doc(&Uid::new("garbled-1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Store(StoreError::Corrupted(_))
    ));
}
