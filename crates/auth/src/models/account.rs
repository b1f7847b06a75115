//! User and pharmacy profile documents.

use serde::{Deserialize, Serialize};

use pharma_direct_core::{Email, Peso, ProductId, Role};

/// Input to the registration workflow.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Display name for the new account.
    pub name: String,
    /// Email to register with. The identity provider validates it.
    pub email: String,
    /// Password. The identity provider enforces its policy.
    pub password: String,
    /// Contact number, if the form collected one.
    pub phone: Option<String>,
    /// Role to register as.
    pub role: Role,
}

impl Registration {
    /// A customer registration with no phone number.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            phone: None,
            role: Role::User,
        }
    }

    /// Set the contact number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Set the role to register as.
    #[must_use]
    pub const fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// A user account document, kept in the `users` collection under the
/// account's UID.
///
/// Written once at registration and then maintained by the order
/// workflows (`successful_orders`, `total_spent`, `cod_unlocked`) and
/// by administrators (`disabled`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UserAccount {
    /// Display name.
    pub name: String,
    /// Email the account registered with.
    pub email: String,
    /// Contact number; empty when never provided.
    pub phone: String,
    /// Role the account registered as.
    pub role: Role,
    /// Administratively disabled accounts are routed to the disabled
    /// notice instead of their dashboard.
    pub disabled: bool,
    /// Orders delivered without incident.
    pub successful_orders: u32,
    /// Lifetime spend.
    pub total_spent: Peso,
    /// Whether cash-on-delivery checkout is available to this account.
    pub cod_unlocked: bool,
    /// Registration time, in milliseconds since the Unix epoch.
    pub created_at: i64,
}

impl UserAccount {
    /// The document written when an account registers.
    ///
    /// Administrators start with cash-on-delivery unlocked; everyone
    /// else earns it through delivered orders.
    #[must_use]
    pub fn at_registration(
        name: &str,
        email: &Email,
        phone: Option<&str>,
        role: Role,
        created_at: i64,
    ) -> Self {
        Self {
            name: name.to_owned(),
            email: email.as_str().to_owned(),
            phone: phone.unwrap_or_default().to_owned(),
            role,
            disabled: false,
            successful_orders: 0,
            total_spent: Peso::ZERO,
            cod_unlocked: role == Role::Admin,
            created_at,
        }
    }
}

/// A pharmacy operator document, kept in the `pharmacies` collection
/// under the owner's UID.
///
/// Created alongside the user document when an account registers as a
/// pharmacy. Written with a merge so fields added by approval tooling
/// survive a re-provisioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PharmacyProfile {
    /// Pharmacy display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact number; empty when never provided.
    pub phone: String,
    /// Set by an administrator once the pharmacy is vetted.
    pub approved: bool,
    /// Product IDs listed by this pharmacy.
    pub products: Vec<ProductId>,
    /// Orders fulfilled by this pharmacy.
    pub total_orders: u32,
}

impl PharmacyProfile {
    /// The document written when an account registers as a pharmacy.
    ///
    /// New pharmacies start unapproved, with no listings.
    #[must_use]
    pub fn at_registration(name: &str, email: &Email, phone: Option<&str>) -> Self {
        Self {
            name: name.to_owned(),
            email: email.as_str().to_owned(),
            phone: phone.unwrap_or_default().to_owned(),
            approved: false,
            products: Vec::new(),
            total_orders: 0,
        }
    }
}
