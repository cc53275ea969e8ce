//! Profile gate - decides whether the signed-in user must finish onboarding.
//!
//! The answer is fetched at most once per session: concurrent callers share
//! the same in-flight request, later callers reuse its result. A failed check
//! fails open so the user is never locked out of the dashboard by a flaky
//! profile endpoint.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::OnceCell;

use crate::domain::foundation::SessionEpoch;
use crate::domain::session::{ProfileCheck, ProfileCompletion};
use crate::ports::{CredentialStore, SessionGateway};

struct GateSlot {
    epoch: SessionEpoch,
    result: Arc<OnceCell<ProfileCheck>>,
}

/// Per-session memo of the profile completion check.
pub struct ProfileGate {
    gateway: Arc<dyn SessionGateway>,
    store: Arc<dyn CredentialStore>,
    slot: Mutex<Option<GateSlot>>,
}

impl ProfileGate {
    pub fn new(gateway: Arc<dyn SessionGateway>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            gateway,
            store,
            slot: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<GateSlot>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the check for the session identified by `epoch`, calling the
    /// gateway only if no call for that session has been made yet.
    pub async fn check(&self, epoch: SessionEpoch) -> ProfileCheck {
        let cell = self.cell_for(epoch);
        *cell.get_or_init(|| self.fetch(epoch)).await
    }

    /// Tri-state completion for the session identified by `epoch`.
    pub fn completion(&self, epoch: SessionEpoch) -> ProfileCompletion {
        match self.slot().as_ref() {
            Some(slot) if slot.epoch == epoch => slot
                .result
                .get()
                .map(ProfileCheck::completion)
                .unwrap_or_default(),
            _ => ProfileCompletion::Unknown,
        }
    }

    /// Forgets the memoized answer. Calls already in flight finish against
    /// their own detached cell and no longer affect the gate.
    pub fn reset(&self) {
        *self.slot() = None;
    }

    fn cell_for(&self, epoch: SessionEpoch) -> Arc<OnceCell<ProfileCheck>> {
        let mut slot = self.slot();
        match slot.as_ref() {
            Some(current) if current.epoch == epoch => Arc::clone(&current.result),
            // A newer session already owns the slot.
            Some(current) if current.epoch.as_u64() > epoch.as_u64() => {
                Arc::new(OnceCell::new())
            }
            _ => {
                let result = Arc::new(OnceCell::new());
                *slot = Some(GateSlot {
                    epoch,
                    result: Arc::clone(&result),
                });
                result
            }
        }
    }

    async fn fetch(&self, epoch: SessionEpoch) -> ProfileCheck {
        let credential = match self.store.get().await {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                tracing::warn!(%epoch, "No credential for profile check, letting user through");
                return ProfileCheck::fail_open();
            }
            Err(error) => {
                tracing::warn!(%epoch, %error, "Credential read failed, letting user through");
                return ProfileCheck::fail_open();
            }
        };

        match self.gateway.fetch_profile_completion(&credential).await {
            Ok(status) => {
                tracing::debug!(
                    %epoch,
                    requires_completion = status.requires_completion,
                    server_next_step = ?status.next_step,
                    "Profile completion checked"
                );
                ProfileCheck::from_requirement(status.requires_completion)
            }
            Err(error) => {
                tracing::warn!(%epoch, %error, "Profile completion check failed, letting user through");
                ProfileCheck::fail_open()
            }
        }
    }
}
