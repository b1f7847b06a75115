//! Pharmacy permissions probe command.
//!
//! Seeds an in-memory sandbox - accounts, product listings, and the
//! owner rule the hosted store enforces on products - then runs the
//! same four-step probe the pharmacy dashboard uses. With
//! `--mismatched-owner` the page is pointed at a rival pharmacy's
//! listings, which reproduces the classic "my edits don't save"
//! support case end to end, permission denial included.
//!
//! # Usage
//!
//! ```bash
//! pharma-cli probe
//! pharma-cli probe --role user --products 0
//! pharma-cli probe --mismatched-owner
//! ```

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;

use pharma_direct_auth::backend::{
    AuthContext, MemoryIdentityProvider, MemoryProfileStore, OwnerWriteRule, StoreError,
    WriteMode, collections, encode,
};
use pharma_direct_auth::marker::MemoryMarkerStore;
use pharma_direct_auth::models::{ProductRecord, Registration};
use pharma_direct_auth::probe::{self, PageContext};
use pharma_direct_auth::services::session::{SessionError, SessionService};
use pharma_direct_core::{Peso, ProductId, Role, Uid};

const PROBE_EMAIL: &str = "probe@pharma-direct.ph";
const PROBE_PASSWORD: &str = "probe-sandbox-1";
const RIVAL_EMAIL: &str = "rival@pharma-direct.ph";
const RIVAL_PASSWORD: &str = "rival-sandbox-1";

/// Seed listings: name, price in centavos, stock.
const SEED_PRODUCTS: &[(&str, i64, i64)] = &[
    ("Biogesic 500mg Tablet", 450, 120),
    ("Amoxicillin 500mg Capsule", 1250, 80),
    ("Cetirizine 10mg Tablet", 900, 60),
    ("Ascorbic Acid 500mg Tablet", 700, 200),
    ("Lagundi 300mg Tablet", 1100, 45),
];

/// Errors that can occur while setting up or running the probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The requested role is not one an account can register with.
    #[error("Invalid role: {0}. Valid roles: admin, pharmacy, user")]
    InvalidRole(String),

    /// Sandbox account setup failed.
    #[error("Sandbox setup failed: {0}")]
    Session(#[from] SessionError),

    /// Sandbox product seeding failed.
    #[error("Sandbox seeding failed: {0}")]
    Seed(#[from] StoreError),
}

/// Seed the sandbox and run the probe.
///
/// # Errors
///
/// Returns [`ProbeError`] if the role does not parse or the sandbox
/// cannot be seeded. A probe that *finds* problems is still `Ok`; the
/// findings are the point.
pub async fn run(
    role: &str,
    products: usize,
    mismatched_owner: bool,
    pharmacy_id: Option<String>,
) -> Result<(), ProbeError> {
    let role: Role = role
        .parse()
        .map_err(|_| ProbeError::InvalidRole(role.to_owned()))?;

    let identity = Arc::new(MemoryIdentityProvider::new());
    let auth_context: Arc<dyn AuthContext> = identity.clone();
    let profiles = Arc::new(MemoryProfileStore::with_rules(
        auth_context,
        vec![OwnerWriteRule::new(collections::PRODUCTS, "pharmacyId")],
    ));
    let markers = Arc::new(MemoryMarkerStore::new());
    let service = SessionService::new(identity.clone(), profiles.clone(), markers);

    tracing::info!("Seeding the sandbox");
    let probing = service
        .register(Registration::new("Probe Pharmacy", PROBE_EMAIL, PROBE_PASSWORD).with_role(role))
        .await?;

    let page_pharmacy_id = if mismatched_owner {
        // A rival pharmacy owns the listings the page will query. Seed
        // them while the rival is signed in, then switch back.
        let rival = service
            .register(
                Registration::new("Rival Pharmacy", RIVAL_EMAIL, RIVAL_PASSWORD)
                    .with_role(Role::Pharmacy),
            )
            .await?;
        seed_products(profiles.as_ref(), &rival.uid, 1).await?;
        service.login(PROBE_EMAIL, PROBE_PASSWORD).await?;
        tracing::info!(rival_uid = %rival.uid, "page pharmacy id points at the rival's listings");
        Some(rival.uid)
    } else {
        pharmacy_id.map(Uid::new)
    };

    seed_products(profiles.as_ref(), &probing.uid, products).await?;

    let report = probe::run(
        identity.as_ref(),
        profiles.as_ref(),
        &PageContext {
            pharmacy_id: page_pharmacy_id,
        },
    )
    .await;

    if report.found_problems() {
        tracing::warn!("The probe surfaced problems; see the report above");
    }
    Ok(())
}

/// Seed `count` listings owned by `owner`, cycling through the sample
/// catalog. The owner must be the current session for the writes to
/// pass the products rule.
async fn seed_products(
    profiles: &MemoryProfileStore,
    owner: &Uid,
    count: usize,
) -> Result<(), StoreError> {
    use pharma_direct_auth::backend::ProfileStore;

    for &(name, centavos, stock) in SEED_PRODUCTS.iter().cycle().take(count) {
        let record = ProductRecord::new(
            name,
            owner.clone(),
            Peso::new(Decimal::new(centavos, 2)),
            stock,
        );
        profiles
            .set(
                collections::PRODUCTS,
                ProductId::generate().as_str(),
                encode(&record)?,
                WriteMode::Overwrite,
            )
            .await?;
    }
    Ok(())
}
