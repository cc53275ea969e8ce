//! Mock session gateway for testing.
//!
//! Implements the `SessionGateway` port without a server. Every operation
//! returns a configurable result, counts its calls, and can be held open
//! until the test releases it, which makes interleavings such as "logout
//! while the dashboard fetch is pending" reproducible.
//!
//! # Example
//!
//! ```ignore
//! use dominion_session::adapters::gateway::{GatewayOp, MockSessionGateway};
//!
//! let gateway = MockSessionGateway::new().requiring_profile_completion();
//! gateway.hold(GatewayOp::ProfileCompletion);
//! // ... start a check, observe it pending ...
//! gateway.release(GatewayOp::ProfileCompletion);
//! assert_eq!(gateway.calls(GatewayOp::ProfileCompletion), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Semaphore;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::session::{
    Credential, DashboardSnapshot, FinancialSummary, UserIdentity,
};
use crate::ports::{
    AuthResponse, GatewayError, LoginRequest, ProfileCompletionStatus, RegistrationRequest,
    SessionGateway,
};

/// The operations of the gateway, for counting and holding calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    Authenticate,
    Register,
    Dashboard,
    ProfileCompletion,
    Logout,
}

#[derive(Debug)]
struct MockState {
    login: Result<AuthResponse, GatewayError>,
    register: Result<AuthResponse, GatewayError>,
    dashboard: Result<DashboardSnapshot, GatewayError>,
    profile: Result<ProfileCompletionStatus, GatewayError>,
    logout: Result<(), GatewayError>,
    calls: HashMap<GatewayOp, usize>,
    holds: HashMap<GatewayOp, Arc<Semaphore>>,
    last_credential: Option<Credential>,
}

/// Mock gateway for testing.
///
/// Defaults: login and registration succeed with token `mock-token`, the
/// dashboard loads, the profile is complete, logout succeeds.
#[derive(Debug)]
pub struct MockSessionGateway {
    state: Mutex<MockState>,
}

impl Default for MockSessionGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSessionGateway {
    /// Creates a gateway where every call succeeds.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                login: Ok(Self::auth_response("mock-token")),
                register: Ok(Self::auth_response("mock-token")),
                dashboard: Ok(Self::sample_snapshot()),
                profile: Ok(ProfileCompletionStatus {
                    requires_completion: false,
                    next_step: Some("dashboard".to_string()),
                }),
                logout: Ok(()),
                calls: HashMap::new(),
                holds: HashMap::new(),
                last_credential: None,
            }),
        }
    }

    /// Identity returned by the default responses.
    pub fn sample_identity() -> UserIdentity {
        UserIdentity::new(UserId::new(1), "jdoe", "jane@example.com", "Jane", "Doe")
    }

    /// Snapshot returned by the default dashboard response.
    pub fn sample_snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            user: Self::sample_identity(),
            financial_summary: FinancialSummary {
                total_balance: json!(2500.75),
                total_available: json!(2400.75),
                currency: "USD".to_string(),
            },
            accounts: vec![json!({ "id": "acc-1", "account_type": "checking" })],
            recent_transactions: vec![json!({ "reference": "TX-1", "amount": "25.00" })],
            verification_required: false,
            extra: Default::default(),
            received_at: Timestamp::now(),
        }
    }

    /// A successful login/registration response carrying `token`.
    pub fn auth_response(token: &str) -> AuthResponse {
        AuthResponse {
            credential: Credential::new(token),
            identity: Self::sample_identity(),
            message: "Login successful".to_string(),
            kyc_required: false,
            server_next_step: Some("dashboard".to_string()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── builders ───────────────────────────────────────────────────────────

    /// Login and registration hand out `token`.
    pub fn with_token(self, token: &str) -> Self {
        self.set_token(token);
        self
    }

    pub fn with_login_error(self, error: GatewayError) -> Self {
        self.fail_login(error);
        self
    }

    pub fn with_register_error(self, error: GatewayError) -> Self {
        self.state().register = Err(error);
        self
    }

    pub fn with_dashboard_error(self, error: GatewayError) -> Self {
        self.fail_dashboard(error);
        self
    }

    pub fn with_profile_error(self, error: GatewayError) -> Self {
        self.state().profile = Err(error);
        self
    }

    pub fn with_logout_error(self, error: GatewayError) -> Self {
        self.state().logout = Err(error);
        self
    }

    /// The profile check reports that onboarding is unfinished.
    pub fn requiring_profile_completion(self) -> Self {
        self.set_profile_requirement(true);
        self
    }

    // ── runtime reconfiguration ────────────────────────────────────────────

    pub fn set_token(&self, token: &str) {
        let mut state = self.state();
        state.login = Ok(Self::auth_response(token));
        state.register = Ok(Self::auth_response(token));
    }

    /// Login fails with `error` until `set_token` is called again.
    pub fn fail_login(&self, error: GatewayError) {
        self.state().login = Err(error);
    }

    pub fn set_profile_requirement(&self, requires_completion: bool) {
        let next_step = if requires_completion {
            "complete-profile"
        } else {
            "dashboard"
        };
        self.state().profile = Ok(ProfileCompletionStatus {
            requires_completion,
            next_step: Some(next_step.to_string()),
        });
    }

    pub fn fail_dashboard(&self, error: GatewayError) {
        self.state().dashboard = Err(error);
    }

    pub fn succeed_dashboard(&self, snapshot: DashboardSnapshot) {
        self.state().dashboard = Ok(snapshot);
    }

    // ── inspection ─────────────────────────────────────────────────────────

    /// Number of calls made to `op` so far (held calls included).
    pub fn calls(&self, op: GatewayOp) -> usize {
        self.state().calls.get(&op).copied().unwrap_or(0)
    }

    /// Number of calls across all operations.
    pub fn total_calls(&self) -> usize {
        self.state().calls.values().sum()
    }

    /// Credential passed to the most recent authorized call.
    pub fn last_credential(&self) -> Option<Credential> {
        self.state().last_credential.clone()
    }

    /// Waits until `op` has been called at least `count` times.
    pub async fn wait_for_calls(&self, op: GatewayOp, count: usize) {
        while self.calls(op) < count {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    // ── holding ────────────────────────────────────────────────────────────

    /// Makes subsequent calls to `op` block until `release` is called.
    pub fn hold(&self, op: GatewayOp) {
        self.state().holds.insert(op, Arc::new(Semaphore::new(0)));
    }

    /// Lets every held and future call to `op` complete.
    pub fn release(&self, op: GatewayOp) {
        if let Some(gate) = self.state().holds.remove(&op) {
            gate.close();
        }
    }

    async fn enter(&self, op: GatewayOp, credential: Option<&Credential>) {
        let gate = {
            let mut state = self.state();
            *state.calls.entry(op).or_insert(0) += 1;
            if let Some(credential) = credential {
                state.last_credential = Some(credential.clone());
            }
            state.holds.get(&op).cloned()
        };

        if let Some(gate) = gate {
            // A closed semaphore means the hold was released.
            let _ = gate.acquire().await;
        }
    }
}

#[async_trait]
impl SessionGateway for MockSessionGateway {
    async fn authenticate(&self, _request: &LoginRequest) -> Result<AuthResponse, GatewayError> {
        self.enter(GatewayOp::Authenticate, None).await;
        self.state().login.clone()
    }

    async fn register(&self, _request: &RegistrationRequest) -> Result<AuthResponse, GatewayError> {
        self.enter(GatewayOp::Register, None).await;
        self.state().register.clone()
    }

    async fn fetch_dashboard_snapshot(
        &self,
        credential: &Credential,
    ) -> Result<DashboardSnapshot, GatewayError> {
        self.enter(GatewayOp::Dashboard, Some(credential)).await;
        self.state().dashboard.clone().map(|mut snapshot| {
            snapshot.received_at = Timestamp::now();
            snapshot
        })
    }

    async fn fetch_profile_completion(
        &self,
        credential: &Credential,
    ) -> Result<ProfileCompletionStatus, GatewayError> {
        self.enter(GatewayOp::ProfileCompletion, Some(credential)).await;
        self.state().profile.clone()
    }

    async fn logout(&self, credential: &Credential) -> Result<(), GatewayError> {
        self.enter(GatewayOp::Logout, Some(credential)).await;
        self.state().logout.clone()
    }
}
