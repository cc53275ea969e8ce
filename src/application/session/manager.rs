//! SessionManager - owns the dashboard session lifecycle.
//!
//! Every operation that awaits the gateway remembers the session epoch it
//! started under and re-checks it before touching state. Logging out or
//! starting a new login advances the epoch, so late responses from an
//! ended session are dropped instead of resurrecting it.

use std::sync::Arc;

use tokio::sync::{watch, Mutex, MutexGuard, OnceCell};

use crate::domain::foundation::{SessionEpoch, StateMachine};
use crate::domain::session::{
    DashboardSnapshot, NextStep, ProfileCheck, SessionStatus, UserIdentity,
};
use crate::ports::{CredentialStore, LoginRequest, RegistrationRequest, SessionGateway};

use super::error::SessionError;
use super::profile_gate::ProfileGate;
use super::view::{AuthOutcome, RefreshOutcome, SessionView};

#[derive(Debug, Default)]
struct SessionState {
    status: SessionStatus,
    epoch: SessionEpoch,
    loading: bool,
    identity: Option<UserIdentity>,
    dashboard: Option<Arc<DashboardSnapshot>>,
}

impl SessionState {
    fn enter(&mut self, target: SessionStatus) {
        if self.status == target {
            return;
        }
        match self.status.transition_to(target) {
            Ok(next) => self.status = next,
            Err(error) => {
                tracing::error!(%error, "Unexpected session transition");
                self.status = target;
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: DashboardSnapshot) {
        self.identity = Some(snapshot.user.clone());
        self.dashboard = Some(Arc::new(snapshot));
        self.enter(SessionStatus::Authenticated);
    }
}

/// The single owner of session state for one process.
///
/// Construct once at startup, call [`bootstrap`](Self::bootstrap), then share
/// it behind an `Arc` with whatever needs to read or change the session.
pub struct SessionManager {
    gateway: Arc<dyn SessionGateway>,
    store: Arc<dyn CredentialStore>,
    profile_gate: ProfileGate,
    state: Mutex<SessionState>,
    bootstrapped: OnceCell<()>,
    changes: watch::Sender<SessionView>,
}

impl SessionManager {
    pub fn new(gateway: Arc<dyn SessionGateway>, store: Arc<dyn CredentialStore>) -> Self {
        let (changes, _) = watch::channel(SessionView::default());
        Self {
            profile_gate: ProfileGate::new(Arc::clone(&gateway), Arc::clone(&store)),
            gateway,
            store,
            state: Mutex::new(SessionState::default()),
            bootstrapped: OnceCell::new(),
            changes,
        }
    }

    // ── observation ────────────────────────────────────────────────────────

    /// Current session state.
    pub fn snapshot(&self) -> SessionView {
        self.changes.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.changes.borrow().status
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.changes.subscribe()
    }

    fn publish(&self, state: &SessionState) {
        self.changes.send_replace(SessionView {
            status: state.status,
            is_loading: state.loading,
            identity: state.identity.clone(),
            dashboard: state.dashboard.clone(),
            profile_completion: self.profile_gate.completion(state.epoch),
            epoch: state.epoch,
        });
    }

    async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    /// Drops identity, snapshot and profile answer, clears the stored
    /// credential and advances the epoch.
    async fn end_session(&self, state: &mut SessionState, reason: &'static str) {
        state.epoch = state.epoch.next();
        state.identity = None;
        state.dashboard = None;
        self.profile_gate.reset();
        state.enter(SessionStatus::Unauthenticated);

        if let Err(error) = self.store.clear().await {
            tracing::warn!(%error, "Failed to clear stored credential");
        }
        tracing::info!(reason, epoch = %state.epoch, "Session ended");
    }

    /// Starts a fresh session for a login or registration attempt.
    async fn begin_attempt(&self) -> SessionEpoch {
        let mut state = self.lock().await;
        state.epoch = state.epoch.next();
        state.identity = None;
        state.dashboard = None;
        self.profile_gate.reset();
        state.enter(SessionStatus::Authenticating);
        self.publish(&state);
        state.epoch
    }

    /// Ends the attempt started at `epoch` unless something newer replaced it.
    async fn abandon_attempt(&self, epoch: SessionEpoch, reason: &'static str) {
        let mut state = self.lock().await;
        if state.epoch == epoch {
            self.end_session(&mut state, reason).await;
            self.publish(&state);
        }
    }

    // ── lifecycle ──────────────────────────────────────────────────────────

    /// Resolves the initial status from the stored credential.
    ///
    /// Runs once per manager; concurrent and later callers wait for that run
    /// and get its result.
    pub async fn bootstrap(&self) -> SessionStatus {
        self.bootstrapped
            .get_or_init(|| self.run_bootstrap())
            .await;
        self.status()
    }

    async fn run_bootstrap(&self) {
        let epoch = {
            let mut state = self.lock().await;
            if state.status != SessionStatus::Unknown {
                tracing::debug!(status = %state.status, "Session already settled, skipping restore");
                return;
            }
            state.loading = true;
            self.publish(&state);
            state.epoch
        };

        let stored = self.store.get().await;

        let credential = match stored {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                let mut state = self.lock().await;
                state.loading = false;
                if state.epoch == epoch {
                    state.enter(SessionStatus::Unauthenticated);
                }
                tracing::debug!("No stored credential");
                self.publish(&state);
                return;
            }
            Err(error) => {
                tracing::warn!(%error, "Stored credential unreadable");
                let mut state = self.lock().await;
                state.loading = false;
                if state.epoch == epoch {
                    self.end_session(&mut state, "unreadable credential").await;
                }
                self.publish(&state);
                return;
            }
        };

        let result = self.gateway.fetch_dashboard_snapshot(&credential).await;

        let mut state = self.lock().await;
        state.loading = false;
        if state.epoch != epoch {
            tracing::debug!(%epoch, current = %state.epoch, "Discarding startup snapshot");
            self.publish(&state);
            return;
        }

        match result {
            Ok(snapshot) => {
                tracing::info!(user_id = %snapshot.user.id, "Session restored");
                state.apply_snapshot(snapshot);
            }
            Err(error) => {
                tracing::warn!(%error, "Stored credential rejected");
                self.end_session(&mut state, "credential rejected").await;
            }
        }
        self.publish(&state);
    }

    /// Signs in with username and password.
    ///
    /// On success the credential is stored, the profile gate is consulted and,
    /// when onboarding is finished, the dashboard is loaded. A failed
    /// dashboard load here only costs the snapshot; the session stays open.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthOutcome, SessionError> {
        let epoch = self.begin_attempt().await;
        tracing::debug!(username = %request.username, epoch = %epoch, "Login started");

        let response = match self.gateway.authenticate(request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::info!(username = %request.username, error = %error, "Login rejected");
                self.abandon_attempt(epoch, "login failed").await;
                return Err(error.into());
            }
        };

        {
            let mut state = self.lock().await;
            if state.epoch != epoch {
                return Err(SessionError::Superseded);
            }
            if let Err(error) = self.store.set(&response.credential).await {
                tracing::error!(%error, "Failed to store credential");
                self.end_session(&mut state, "credential not stored").await;
                self.publish(&state);
                return Err(error.into());
            }
            state.identity = Some(response.identity.clone());
            state.enter(SessionStatus::Authenticated);
            self.publish(&state);
        }
        tracing::info!(
            user_id = %response.identity.id,
            server_next_step = ?response.server_next_step,
            "Login succeeded"
        );

        let check = self.profile_gate.check(epoch).await;

        let mut outcome = AuthOutcome {
            identity: response.identity,
            next_step: check.next_step,
            snapshot_loaded: false,
            message: response.message,
            kyc_required: response.kyc_required,
        };

        if check.requires_completion {
            let state = self.lock().await;
            if state.epoch != epoch {
                return Err(SessionError::Superseded);
            }
            self.publish(&state);
            return Ok(outcome);
        }

        let result = self
            .gateway
            .fetch_dashboard_snapshot(&response.credential)
            .await;

        let mut state = self.lock().await;
        if state.epoch != epoch {
            return Err(SessionError::Superseded);
        }
        match result {
            Ok(snapshot) => {
                outcome.identity = snapshot.user.clone();
                outcome.snapshot_loaded = true;
                state.apply_snapshot(snapshot);
            }
            Err(error) => {
                tracing::warn!(%error, "Dashboard load after login failed");
            }
        }
        self.publish(&state);
        Ok(outcome)
    }

    /// Creates an account and signs in with it.
    ///
    /// Registration only counts once the dashboard has loaded; if that load
    /// fails the whole call fails and nothing is kept.
    pub async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<AuthOutcome, SessionError> {
        let epoch = self.begin_attempt().await;
        tracing::debug!(username = %request.username, epoch = %epoch, "Registration started");

        let response = match self.gateway.register(request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::info!(username = %request.username, error = %error, "Registration rejected");
                self.abandon_attempt(epoch, "registration failed").await;
                return Err(error.into());
            }
        };

        let snapshot = match self
            .gateway
            .fetch_dashboard_snapshot(&response.credential)
            .await
        {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(%error, "Dashboard load after registration failed");
                let mut state = self.lock().await;
                if state.epoch != epoch {
                    return Err(SessionError::Superseded);
                }
                self.end_session(&mut state, "registration incomplete").await;
                self.publish(&state);
                return Err(error.into());
            }
        };

        let mut state = self.lock().await;
        if state.epoch != epoch {
            return Err(SessionError::Superseded);
        }
        if let Err(error) = self.store.set(&response.credential).await {
            tracing::error!(%error, "Failed to store credential");
            self.end_session(&mut state, "credential not stored").await;
            self.publish(&state);
            return Err(error.into());
        }

        let identity = snapshot.user.clone();
        state.apply_snapshot(snapshot);
        self.publish(&state);
        tracing::info!(user_id = %identity.id, "Registration succeeded");

        Ok(AuthOutcome {
            identity,
            next_step: NextStep::Dashboard,
            snapshot_loaded: true,
            message: response.message,
            kyc_required: response.kyc_required,
        })
    }

    /// Ends the session. Never fails: local state is cleared first, then the
    /// server is told on a best-effort basis.
    pub async fn logout(&self) {
        let credential = match self.store.get().await {
            Ok(credential) => credential,
            Err(error) => {
                tracing::warn!(%error, "Could not read credential for logout");
                None
            }
        };

        {
            let mut state = self.lock().await;
            self.end_session(&mut state, "logout").await;
            self.publish(&state);
        }

        if let Some(credential) = credential {
            if let Err(error) = self.gateway.logout(&credential).await {
                tracing::warn!(%error, "Server logout failed");
            }
        }
    }

    /// Reloads the dashboard snapshot. Any failure ends the session.
    pub async fn refresh_snapshot(&self) -> RefreshOutcome {
        let epoch = {
            let state = self.lock().await;
            if !state.status.is_authenticated() {
                return RefreshOutcome::Skipped;
            }
            state.epoch
        };

        let credential = match self.store.get().await {
            Ok(Some(credential)) => credential,
            stored => {
                if let Err(error) = stored {
                    tracing::warn!(%error, "Could not read credential for refresh");
                }
                let mut state = self.lock().await;
                if state.epoch != epoch {
                    return RefreshOutcome::Discarded;
                }
                self.end_session(&mut state, "credential missing").await;
                self.publish(&state);
                return RefreshOutcome::SessionEnded;
            }
        };

        let result = self.gateway.fetch_dashboard_snapshot(&credential).await;

        let mut state = self.lock().await;
        if state.epoch != epoch {
            tracing::debug!(%epoch, current = %state.epoch, "Discarding refreshed snapshot");
            return RefreshOutcome::Discarded;
        }
        let outcome = match result {
            Ok(snapshot) => {
                state.apply_snapshot(snapshot);
                RefreshOutcome::Refreshed
            }
            Err(error) => {
                tracing::warn!(%error, "Dashboard refresh failed");
                self.end_session(&mut state, "refresh failed").await;
                RefreshOutcome::SessionEnded
            }
        };
        self.publish(&state);
        outcome
    }

    /// Asks whether the signed-in user still has to finish onboarding.
    ///
    /// Answered at most once per session. Callers that are not signed in get
    /// "not required" without a gateway call.
    pub async fn check_profile_completion(&self) -> ProfileCheck {
        let epoch = {
            let state = self.lock().await;
            if !state.status.is_authenticated() {
                return ProfileCheck::not_required();
            }
            state.epoch
        };

        let check = self.profile_gate.check(epoch).await;

        let state = self.lock().await;
        if state.epoch != epoch {
            return ProfileCheck::not_required();
        }
        self.publish(&state);
        check
    }
}
