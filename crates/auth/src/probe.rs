//! Pharmacy permissions probe.
//!
//! A manually triggered diagnostic for the pharmacy dashboard's
//! recurring support case: "my product edits don't save". It walks the
//! authorization chain one observable step at a time - who is signed
//! in, what role their user document carries, which products the page's
//! pharmacy ID actually matches, and whether a no-op product update is
//! accepted - and reports every finding without attempting any repair.
//! Store errors are surfaced with their code and message verbatim,
//! because those strings are what the support playbook keys on.

use chrono::Utc;
use serde_json::{Value, json};

use pharma_direct_core::{ProductId, Role, Uid};

use crate::backend::{
    DocEntry, Document, Identity, IdentityProvider, ProfileStore, StoreError, WriteMode,
    collections, decode,
};
use crate::models::account::UserAccount;
use crate::models::product::ProductRecord;

/// Page-supplied context for a probe run.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// The pharmacy ID the page was opened for, when the page set one.
    /// The probe falls back to the signed-in UID.
    pub pharmacy_id: Option<Uid>,
}

/// What the role check found.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleCheck {
    /// The user document exists and carries this role.
    Found(Role),
    /// No user document for the signed-in UID.
    Missing,
    /// The store refused or failed the read.
    Failed(StoreError),
}

/// One product matched by the ownership query.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductMatch {
    /// Document ID of the listing.
    pub id: ProductId,
    /// Listing name.
    pub name: String,
    /// Owner recorded on the listing.
    pub pharmacy_id: Option<Uid>,
    /// Whether the recorded owner is the signed-in UID.
    pub owned_by_current_user: bool,
}

/// What the products check found.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductsCheck {
    /// The query ran; these listings matched the filter.
    Listed {
        /// The pharmacy ID the query filtered on.
        filter: Uid,
        /// Matching listings, in stable ID order.
        matches: Vec<ProductMatch>,
    },
    /// The store refused or failed the query.
    Failed(StoreError),
}

/// What the no-op update attempt found.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateCheck {
    /// The write was accepted.
    Succeeded {
        /// The listing that was written.
        product: ProductId,
    },
    /// Nothing matched the filter, so there was nothing to write.
    NoProducts,
    /// The store refused or failed the write.
    Failed(StoreError),
}

/// Findings of one probe run.
///
/// `None` steps were skipped because no one was signed in.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    /// The signed-in identity, if any.
    pub identity: Option<Identity>,
    /// The pharmacy ID the page supplied, if any.
    pub page_pharmacy_id: Option<Uid>,
    /// Step 2: role on the user document.
    pub role: Option<RoleCheck>,
    /// Step 3: products matching the pharmacy filter.
    pub products: Option<ProductsCheck>,
    /// Step 4: the no-op update attempt.
    pub update: Option<UpdateCheck>,
}

impl ProbeReport {
    /// Whether the run surfaced anything the support playbook would
    /// act on: a refused step, or a matched listing owned by someone
    /// else.
    #[must_use]
    pub fn found_problems(&self) -> bool {
        let role_failed = matches!(self.role, Some(RoleCheck::Failed(_)));
        let products_failed = matches!(self.products, Some(ProductsCheck::Failed(_)));
        let update_failed = matches!(self.update, Some(UpdateCheck::Failed(_)));
        let foreign_listing = match &self.products {
            Some(ProductsCheck::Listed { matches, .. }) => {
                matches.iter().any(|m| !m.owned_by_current_user)
            }
            _ => false,
        };
        role_failed || products_failed || update_failed || foreign_listing
    }
}

/// Run the pharmacy permissions probe.
///
/// Reports through `tracing` at info level and returns the findings.
/// The probe never repairs anything; a failed step is a finding, not an
/// error, so this does not return `Result`.
pub async fn run(
    identity: &dyn IdentityProvider,
    profiles: &dyn ProfileStore,
    page: &PageContext,
) -> ProbeReport {
    tracing::info!("Pharmacy permissions probe");
    tracing::info!("==========================");

    let current = identity.current_identity();

    tracing::info!("1. Authentication check:");
    match &current {
        Some(user) => {
            tracing::info!("   - signed in: YES");
            tracing::info!("   - uid: {}", user.uid);
            tracing::info!("   - email: {}", user.email);
        }
        None => tracing::info!("   - signed in: NO"),
    }
    match &page.pharmacy_id {
        Some(id) => tracing::info!("   - pharmacy id from page: {id}"),
        None => tracing::info!("   - pharmacy id from page: not set"),
    }

    let Some(user) = current else {
        tracing::info!("Not signed in; skipping the remaining checks");
        return ProbeReport {
            identity: None,
            page_pharmacy_id: page.pharmacy_id.clone(),
            role: None,
            products: None,
            update: None,
        };
    };

    let role = check_role(profiles, &user).await;
    let products = check_products(profiles, &user, page).await;
    let update = check_update(profiles, &user, page).await;

    let report = ProbeReport {
        identity: Some(user),
        page_pharmacy_id: page.pharmacy_id.clone(),
        role: Some(role),
        products: Some(products),
        update: Some(update),
    };

    tracing::info!("==========================");
    if report.found_problems() {
        tracing::info!("If you see permission errors:");
        tracing::info!("  1. Check that the store's security rules are deployed");
        tracing::info!("  2. Verify the product's pharmacyId matches the signed-in uid");
    } else {
        tracing::info!("No permission problems found");
    }
    tracing::info!("==========================");

    report
}

/// Step 2: what role the user document carries.
async fn check_role(profiles: &dyn ProfileStore, user: &Identity) -> RoleCheck {
    tracing::info!("2. Role check:");
    match profiles.get(collections::USERS, user.uid.as_str()).await {
        Ok(Some(fields)) => match decode::<UserAccount>(fields) {
            Ok(account) => {
                tracing::info!("   - role: {}", account.role);
                RoleCheck::Found(account.role)
            }
            Err(err) => {
                report_store_error("reading the user document", &err);
                RoleCheck::Failed(err)
            }
        },
        Ok(None) => {
            tracing::info!("   - user document not found");
            RoleCheck::Missing
        }
        Err(err) => {
            report_store_error("reading the user document", &err);
            RoleCheck::Failed(err)
        }
    }
}

/// Step 3: which products the pharmacy filter matches, and who owns
/// them.
async fn check_products(
    profiles: &dyn ProfileStore,
    user: &Identity,
    page: &PageContext,
) -> ProductsCheck {
    let filter = effective_pharmacy_id(user, page);
    tracing::info!("3. Products check:");
    tracing::info!("   - querying products with pharmacyId == {filter}");

    let entries = match profiles
        .query_eq(
            collections::PRODUCTS,
            "pharmacyId",
            &Value::String(filter.as_str().to_owned()),
            None,
        )
        .await
    {
        Ok(entries) => entries,
        Err(err) => {
            report_store_error("querying products", &err);
            return ProductsCheck::Failed(err);
        }
    };

    tracing::info!("   - found {} matching products", entries.len());
    let matches = entries
        .into_iter()
        .map(|DocEntry { id, fields }| {
            let record = decode::<ProductRecord>(fields).unwrap_or_default();
            let owned = record.pharmacy_id.as_ref() == Some(&user.uid);
            tracing::info!("   - product: {}", record.name);
            match &record.pharmacy_id {
                Some(owner) => tracing::info!("     * listing pharmacyId: {owner}"),
                None => tracing::info!("     * listing pharmacyId: not set"),
            }
            tracing::info!("     * signed-in uid: {}", user.uid);
            tracing::info!("     * owner match: {}", if owned { "YES" } else { "NO" });
            ProductMatch {
                id: ProductId::new(id),
                name: record.name,
                pharmacy_id: record.pharmacy_id,
                owned_by_current_user: owned,
            }
        })
        .collect();

    ProductsCheck::Listed { filter, matches }
}

/// Step 4: whether a no-op update of the first matching product is
/// accepted. Writes the listing's own stock back plus a fresh
/// `updatedAt`, so nothing observable changes when the write succeeds.
async fn check_update(
    profiles: &dyn ProfileStore,
    user: &Identity,
    page: &PageContext,
) -> UpdateCheck {
    let filter = effective_pharmacy_id(user, page);
    tracing::info!("4. Product update test:");

    match try_noop_update(profiles, &filter).await {
        Ok(Some(product)) => {
            tracing::info!("   - update accepted");
            UpdateCheck::Succeeded { product }
        }
        Ok(None) => {
            tracing::info!("   - no products found to test an update on");
            UpdateCheck::NoProducts
        }
        Err(err) => {
            tracing::info!("   - update failed");
            tracing::info!("     * error code: {}", err.code());
            tracing::info!("     * error message: {}", err.message());
            UpdateCheck::Failed(err)
        }
    }
}

async fn try_noop_update(
    profiles: &dyn ProfileStore,
    filter: &Uid,
) -> Result<Option<ProductId>, StoreError> {
    let entries = profiles
        .query_eq(
            collections::PRODUCTS,
            "pharmacyId",
            &Value::String(filter.as_str().to_owned()),
            Some(1),
        )
        .await?;
    let Some(DocEntry { id, fields }) = entries.into_iter().next() else {
        return Ok(None);
    };

    let record = decode::<ProductRecord>(fields).unwrap_or_default();
    tracing::info!("   - attempting a no-op update on: {}", record.name);

    let mut update = Document::new();
    update.insert("stock".to_owned(), json!(record.stock));
    update.insert("updatedAt".to_owned(), json!(Utc::now().timestamp_millis()));
    profiles
        .set(collections::PRODUCTS, &id, update, WriteMode::Merge)
        .await?;

    Ok(Some(ProductId::new(id)))
}

/// The pharmacy ID a dashboard page would operate on: the page's own,
/// falling back to the signed-in UID.
fn effective_pharmacy_id(user: &Identity, page: &PageContext) -> Uid {
    page.pharmacy_id.clone().unwrap_or_else(|| user.uid.clone())
}

fn report_store_error(context: &str, err: &StoreError) {
    tracing::info!("   - error {context}: [{}] {}", err.code(), err.message());
}
