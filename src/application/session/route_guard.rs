//! RouteGuard - decides what a protected screen should do.

use std::fmt;
use std::sync::Arc;

use crate::domain::foundation::SessionEpoch;
use crate::domain::session::{NextStep, SessionStatus};

use super::manager::SessionManager;

/// Screens the guard can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    SignIn,
    CompleteProfile,
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::SignIn => "/signin",
            Route::CompleteProfile => "/complete-profile",
            Route::Dashboard => "/dashboard",
        }
    }
}

impl From<NextStep> for Route {
    fn from(step: NextStep) -> Self {
        match step {
            NextStep::CompleteProfile => Route::CompleteProfile,
            NextStep::Dashboard => Route::Dashboard,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// What the guarded screen should do right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session has not settled yet; show a placeholder.
    Loading,
    Redirect(Route),
    Render,
}

/// Guard for one protected screen.
///
/// Holds its own "already checked" marker so a screen asks the profile gate
/// at most once per session no matter how often it re-evaluates.
pub struct RouteGuard {
    session: Arc<SessionManager>,
    require_profile_completion: bool,
    checked: Option<(SessionEpoch, bool)>,
}

impl RouteGuard {
    /// Guard that also sends users with unfinished onboarding to the
    /// profile completion screen.
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            require_profile_completion: true,
            checked: None,
        }
    }

    /// Guard that only requires a signed-in user.
    pub fn authenticated_only(session: Arc<SessionManager>) -> Self {
        Self {
            require_profile_completion: false,
            ..Self::new(session)
        }
    }

    pub async fn evaluate(&mut self) -> GuardDecision {
        let view = self.session.snapshot();

        if view.is_pending() {
            return GuardDecision::Loading;
        }
        if view.status != SessionStatus::Authenticated {
            return GuardDecision::Redirect(Route::SignIn);
        }
        if !self.require_profile_completion {
            return GuardDecision::Render;
        }

        let requires_completion = match self.checked {
            Some((epoch, requires_completion)) if epoch == view.epoch => requires_completion,
            _ => {
                let check = self.session.check_profile_completion().await;
                self.checked = Some((view.epoch, check.requires_completion));
                check.requires_completion
            }
        };

        if requires_completion {
            GuardDecision::Redirect(Route::CompleteProfile)
        } else {
            GuardDecision::Render
        }
    }

    /// Evaluates, waiting out `Loading` until the session settles.
    pub async fn resolve(&mut self) -> GuardDecision {
        let mut changes = self.session.subscribe();
        loop {
            let decision = self.evaluate().await;
            if decision != GuardDecision::Loading {
                return decision;
            }
            if changes.changed().await.is_err() {
                return decision;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{GatewayOp, InMemoryCredentialStore, MockSessionGateway};
    use crate::domain::session::Credential;
    use crate::ports::LoginRequest;

    fn session(gateway: &Arc<MockSessionGateway>, store: InMemoryCredentialStore) -> Arc<SessionManager> {
        Arc::new(SessionManager::new(gateway.clone(), Arc::new(store)))
    }

    fn stored() -> InMemoryCredentialStore {
        InMemoryCredentialStore::with_credential(Credential::new("stored-token"))
    }

    #[test]
    fn routes_have_paths() {
        assert_eq!(Route::SignIn.path(), "/signin");
        assert_eq!(Route::from(NextStep::CompleteProfile).path(), "/complete-profile");
        assert_eq!(Route::from(NextStep::Dashboard).to_string(), "/dashboard");
    }

    #[tokio::test]
    async fn loading_before_bootstrap() {
        let gateway = Arc::new(MockSessionGateway::new());
        let mut guard = RouteGuard::new(session(&gateway, stored()));

        assert_eq!(guard.evaluate().await, GuardDecision::Loading);
        assert_eq!(gateway.total_calls(), 0);
    }

    #[tokio::test]
    async fn signed_out_redirects_to_sign_in() {
        let gateway = Arc::new(MockSessionGateway::new());
        let session = session(&gateway, InMemoryCredentialStore::new());
        session.bootstrap().await;

        let mut guard = RouteGuard::new(session);

        assert_eq!(guard.evaluate().await, GuardDecision::Redirect(Route::SignIn));
    }

    #[tokio::test]
    async fn incomplete_profile_redirects_to_onboarding() {
        let gateway = Arc::new(MockSessionGateway::new().requiring_profile_completion());
        let session = session(&gateway, stored());
        session.bootstrap().await;

        let mut guard = RouteGuard::new(session);

        assert_eq!(
            guard.evaluate().await,
            GuardDecision::Redirect(Route::CompleteProfile)
        );
    }

    #[tokio::test]
    async fn complete_profile_renders() {
        let gateway = Arc::new(MockSessionGateway::new());
        let session = session(&gateway, stored());
        session.bootstrap().await;

        let mut guard = RouteGuard::new(session);

        assert_eq!(guard.evaluate().await, GuardDecision::Render);
    }

    #[tokio::test]
    async fn authenticated_only_skips_profile_check() {
        let gateway = Arc::new(MockSessionGateway::new().requiring_profile_completion());
        let session = session(&gateway, stored());
        session.bootstrap().await;

        let mut guard = RouteGuard::authenticated_only(session);

        assert_eq!(guard.evaluate().await, GuardDecision::Render);
        assert_eq!(gateway.calls(GatewayOp::ProfileCompletion), 0);
    }

    #[tokio::test]
    async fn repeated_evaluation_checks_once() {
        let gateway = Arc::new(MockSessionGateway::new());
        let session = session(&gateway, stored());
        session.bootstrap().await;

        let mut first = RouteGuard::new(Arc::clone(&session));
        let mut second = RouteGuard::new(session);

        for _ in 0..3 {
            assert_eq!(first.evaluate().await, GuardDecision::Render);
            assert_eq!(second.evaluate().await, GuardDecision::Render);
        }
        assert_eq!(gateway.calls(GatewayOp::ProfileCompletion), 1);
    }

    #[tokio::test]
    async fn failed_profile_check_lets_user_through() {
        let gateway = Arc::new(
            MockSessionGateway::new()
                .with_profile_error(crate::ports::GatewayError::network("timeout")),
        );
        let session = session(&gateway, stored());
        session.bootstrap().await;

        let mut guard = RouteGuard::new(session);

        assert_eq!(guard.evaluate().await, GuardDecision::Render);
    }

    #[tokio::test]
    async fn logout_redirects_and_next_session_rechecks() {
        let gateway = Arc::new(MockSessionGateway::new());
        let session = session(&gateway, stored());
        session.bootstrap().await;
        let mut guard = RouteGuard::new(Arc::clone(&session));
        assert_eq!(guard.evaluate().await, GuardDecision::Render);

        session.logout().await;
        assert_eq!(guard.evaluate().await, GuardDecision::Redirect(Route::SignIn));

        gateway.set_profile_requirement(true);
        session
            .login(&LoginRequest::new("jdoe", "pw"))
            .await
            .unwrap();
        assert_eq!(
            guard.evaluate().await,
            GuardDecision::Redirect(Route::CompleteProfile)
        );
    }

    #[tokio::test]
    async fn resolve_waits_for_bootstrap() {
        let gateway = Arc::new(MockSessionGateway::new());
        gateway.hold(GatewayOp::Dashboard);
        let session = session(&gateway, stored());

        let boot = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.bootstrap().await })
        };
        let guarded = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { RouteGuard::new(session).resolve().await })
        };

        gateway.wait_for_calls(GatewayOp::Dashboard, 1).await;
        gateway.release(GatewayOp::Dashboard);

        boot.await.unwrap();
        assert_eq!(guarded.await.unwrap(), GuardDecision::Render);
    }
}
