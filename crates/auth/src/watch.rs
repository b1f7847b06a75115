//! Auth-state watcher.
//!
//! Subscribes to the identity provider's auth-state stream and routes
//! each signed-in account to its landing page: disabled accounts to the
//! disabled notice regardless of role, everyone else by role, accounts
//! without a user document to the customer dashboard as implicit
//! customers. Sign-out events are ignored; what a page does for a
//! signed-out visitor is the host's business.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use pharma_direct_core::Role;

use crate::backend::AuthStateChange;
use crate::redirect::{Destination, Navigator, redirect_by_role};
use crate::services::session::SessionService;

/// Handle to a running auth watcher.
///
/// The watcher runs until [`WatchHandle::stop`] is called or the handle
/// is dropped; dropping aborts the task.
pub struct WatchHandle {
    shutdown: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl WatchHandle {
    /// Stop the watcher and wait for it to finish.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let _ = (&mut self.join).await;
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.join.abort();
    }
}

/// Start watching auth-state changes, routing every sign-in through
/// `navigator`.
///
/// Events that arrive while the watcher is busy routing are buffered;
/// if the buffer overflows, the watcher logs how many events it missed
/// and keeps going with the newest ones.
pub fn watch_auth_and_redirect(
    service: SessionService,
    navigator: Arc<dyn Navigator>,
) -> WatchHandle {
    let mut events = service.auth_events();
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let join = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                event = events.recv() => match event {
                    Ok(AuthStateChange::SignedIn(identity)) => {
                        route(&service, navigator.as_ref(), &identity).await;
                    }
                    Ok(AuthStateChange::SignedOut) => {}
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "auth watcher fell behind the event stream");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    });

    WatchHandle {
        shutdown: Some(shutdown_tx),
        join,
    }
}

/// Route one signed-in identity. A store failure here means nobody gets
/// redirected; the page stays where it is and the failure is logged.
async fn route(
    service: &SessionService,
    navigator: &dyn Navigator,
    identity: &crate::backend::Identity,
) {
    let account = match service.fetch_user_doc(&identity.uid).await {
        Ok(account) => account,
        Err(err) => {
            tracing::warn!(
                uid = %identity.uid,
                error = %err,
                "could not load the account for routing"
            );
            return;
        }
    };

    let destination = match account {
        Some(account) if account.disabled => Destination::AccountDisabled,
        Some(account) => redirect_by_role(account.role),
        None => redirect_by_role(Role::User),
    };

    tracing::debug!(uid = %identity.uid, %destination, "routing signed-in account");
    navigator.navigate(destination);
}
