//! Role-based destinations and navigation.

use std::sync::Mutex;

use pharma_direct_core::Role;

/// A routable page of the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Administration dashboard.
    AdminDashboard,
    /// Pharmacy operator dashboard.
    PharmacyDashboard,
    /// Customer dashboard.
    UserDashboard,
    /// Public landing page. Also the fallback when no role fits.
    Home,
    /// Account-disabled notice.
    AccountDisabled,
}

impl Destination {
    /// Relative path of the page.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::AdminDashboard => "admin.html",
            Self::PharmacyDashboard => "pharmacy.html",
            Self::UserDashboard => "user-dashboard.html",
            Self::Home => "index.html",
            Self::AccountDisabled => "disabled.html",
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// The landing destination for a role.
///
/// Total over every role value. Unrecognized roles land on the public
/// page, not the customer dashboard: an account with a role this client
/// cannot interpret should not be treated as a customer.
#[must_use]
pub const fn redirect_by_role(role: Role) -> Destination {
    match role {
        Role::Admin => Destination::AdminDashboard,
        Role::Pharmacy => Destination::PharmacyDashboard,
        Role::User => Destination::UserDashboard,
        Role::Unknown => Destination::Home,
    }
}

/// Performs page navigation.
///
/// Navigation is a side effect owned by the host: a real frontend swaps
/// the page, tests record the destination.
pub trait Navigator: Send + Sync {
    /// Navigate to `destination`.
    fn navigate(&self, destination: Destination);
}

/// [`Navigator`] that records every destination it was sent to.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<Destination>>,
}

impl RecordingNavigator {
    /// Create a navigator with no recorded visits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every destination navigated to, in order.
    #[must_use]
    pub fn visits(&self) -> Vec<Destination> {
        self.visits
            .lock()
            .map(|visits| visits.clone())
            .unwrap_or_default()
    }

    /// The most recent destination, if any.
    #[must_use]
    pub fn last(&self) -> Option<Destination> {
        self.visits().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, destination: Destination) {
        if let Ok(mut visits) = self.visits.lock() {
            visits.push(destination);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn every_role_has_a_destination() {
        assert_eq!(redirect_by_role(Role::Admin), Destination::AdminDashboard);
        assert_eq!(
            redirect_by_role(Role::Pharmacy),
            Destination::PharmacyDashboard
        );
        assert_eq!(redirect_by_role(Role::User), Destination::UserDashboard);
        assert_eq!(redirect_by_role(Role::Unknown), Destination::Home);
    }

    #[test]
    fn unknown_roles_do_not_reach_the_customer_dashboard() {
        assert_ne!(redirect_by_role(Role::Unknown), Destination::UserDashboard);
    }

    #[test]
    fn destination_paths_are_page_files() {
        assert_eq!(Destination::AdminDashboard.path(), "admin.html");
        assert_eq!(Destination::PharmacyDashboard.path(), "pharmacy.html");
        assert_eq!(Destination::UserDashboard.path(), "user-dashboard.html");
        assert_eq!(Destination::Home.path(), "index.html");
        assert_eq!(Destination::AccountDisabled.path(), "disabled.html");
    }

    #[test]
    fn recording_navigator_keeps_order() {
        let navigator = RecordingNavigator::new();
        navigator.navigate(Destination::Home);
        navigator.navigate(Destination::PharmacyDashboard);

        assert_eq!(
            navigator.visits(),
            vec![Destination::Home, Destination::PharmacyDashboard]
        );
        assert_eq!(navigator.last(), Some(Destination::PharmacyDashboard));
    }
}
