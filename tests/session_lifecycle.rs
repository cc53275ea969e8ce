//! Session lifecycle integration tests.
//!
//! Drives `SessionManager` and `RouteGuard` through the public API with the
//! mock gateway, including arbitrary operation sequences.

use std::sync::Arc;

use futures::future::join_all;
use proptest::prelude::*;

use dominion_session::adapters::{GatewayOp, InMemoryCredentialStore, MockSessionGateway};
use dominion_session::application::{
    GuardDecision, RefreshOutcome, Route, RouteGuard, SessionError, SessionManager, SessionView,
};
use dominion_session::domain::session::{Credential, ProfileCompletion, SessionStatus};
use dominion_session::ports::{GatewayError, LoginRequest, RegistrationRequest};

fn session_with(
    gateway: MockSessionGateway,
    store: InMemoryCredentialStore,
) -> (Arc<MockSessionGateway>, Arc<SessionManager>) {
    let gateway = Arc::new(gateway);
    let session = Arc::new(SessionManager::new(gateway.clone(), Arc::new(store)));
    (gateway, session)
}

fn login_request() -> LoginRequest {
    LoginRequest::new("jdoe", "pw")
}

// ════════════════════════════════════════════════════════════════════════════
// Interleavings
// ════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn many_guards_share_one_profile_call() {
    let (gateway, session) = session_with(
        MockSessionGateway::new().requiring_profile_completion(),
        InMemoryCredentialStore::with_credential(Credential::new("stored")),
    );
    session.bootstrap().await;
    gateway.hold(GatewayOp::ProfileCompletion);

    let guards = (0..10).map(|_| {
        let session = Arc::clone(&session);
        tokio::spawn(async move { RouteGuard::new(session).evaluate().await })
    });
    let pending = tokio::spawn(join_all(guards));

    gateway.wait_for_calls(GatewayOp::ProfileCompletion, 1).await;
    gateway.release(GatewayOp::ProfileCompletion);

    for decision in pending.await.unwrap() {
        assert_eq!(
            decision.unwrap(),
            GuardDecision::Redirect(Route::CompleteProfile)
        );
    }
    assert_eq!(gateway.calls(GatewayOp::ProfileCompletion), 1);
}

#[tokio::test]
async fn newer_login_supersedes_older_one() {
    let (gateway, session) = session_with(MockSessionGateway::new(), InMemoryCredentialStore::new());
    gateway.hold(GatewayOp::Authenticate);

    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.login(&login_request()).await })
    };
    gateway.wait_for_calls(GatewayOp::Authenticate, 1).await;

    let second = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.login(&login_request()).await })
    };
    gateway.wait_for_calls(GatewayOp::Authenticate, 2).await;
    gateway.release(GatewayOp::Authenticate);

    assert!(matches!(first.await.unwrap(), Err(SessionError::Superseded)));
    assert!(second.await.unwrap().is_ok());
    assert_eq!(session.status(), SessionStatus::Authenticated);
}

#[tokio::test]
async fn logout_during_post_login_dashboard_load() {
    let (gateway, session) = session_with(MockSessionGateway::new(), InMemoryCredentialStore::new());
    gateway.hold(GatewayOp::Dashboard);

    let login = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.login(&login_request()).await })
    };
    gateway.wait_for_calls(GatewayOp::Dashboard, 1).await;
    assert_eq!(session.status(), SessionStatus::Authenticated);

    session.logout().await;
    gateway.release(GatewayOp::Dashboard);

    assert!(matches!(login.await.unwrap(), Err(SessionError::Superseded)));
    let view = session.snapshot();
    assert_eq!(view.status, SessionStatus::Unauthenticated);
    assert!(view.dashboard.is_none());
    assert_eq!(gateway.calls(GatewayOp::Logout), 1);
}

#[tokio::test]
async fn refresh_after_logout_is_skipped() {
    let (gateway, session) = session_with(
        MockSessionGateway::new(),
        InMemoryCredentialStore::with_credential(Credential::new("stored")),
    );
    session.bootstrap().await;
    session.logout().await;

    assert_eq!(session.refresh_snapshot().await, RefreshOutcome::Skipped);
    assert_eq!(gateway.calls(GatewayOp::Dashboard), 1);
}

#[tokio::test]
async fn guard_resolves_once_login_completes() {
    let (gateway, session) = session_with(MockSessionGateway::new(), InMemoryCredentialStore::new());
    session.bootstrap().await;
    gateway.hold(GatewayOp::Authenticate);

    let login = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.login(&login_request()).await })
    };
    gateway.wait_for_calls(GatewayOp::Authenticate, 1).await;

    let mut guard = RouteGuard::new(Arc::clone(&session));
    assert_eq!(guard.evaluate().await, GuardDecision::Loading);

    gateway.release(GatewayOp::Authenticate);
    login.await.unwrap().unwrap();

    assert_eq!(guard.resolve().await, GuardDecision::Render);
}

#[tokio::test]
async fn startup_restore_during_registration_keeps_the_new_account() {
    let (gateway, session) = session_with(MockSessionGateway::new(), InMemoryCredentialStore::new());
    gateway.hold(GatewayOp::Register);

    let register = {
        let session = Arc::clone(&session);
        tokio::spawn(async move {
            let request = RegistrationRequest::new("jdoe", "jane@example.com", "pw");
            session.register(&request).await
        })
    };
    gateway.wait_for_calls(GatewayOp::Register, 1).await;

    let mut guard = RouteGuard::new(Arc::clone(&session));
    assert_eq!(session.bootstrap().await, SessionStatus::Authenticating);
    assert_eq!(guard.evaluate().await, GuardDecision::Loading);

    gateway.release(GatewayOp::Register);
    register.await.unwrap().unwrap();

    assert_eq!(guard.resolve().await, GuardDecision::Render);
    assert_eq!(session.bootstrap().await, SessionStatus::Authenticated);
}

// ════════════════════════════════════════════════════════════════════════════
// Arbitrary sequences
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
enum Op {
    Bootstrap,
    Login { accepted: bool },
    Register,
    Logout,
    Refresh { dashboard_up: bool },
    CheckProfile,
    ProfileRequired(bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Bootstrap),
        any::<bool>().prop_map(|accepted| Op::Login { accepted }),
        Just(Op::Register),
        Just(Op::Logout),
        any::<bool>().prop_map(|dashboard_up| Op::Refresh { dashboard_up }),
        Just(Op::CheckProfile),
        any::<bool>().prop_map(Op::ProfileRequired),
    ]
}

fn check_consistent(
    view: &SessionView,
    stored: Option<&Credential>,
) -> Result<(), TestCaseError> {
    prop_assert!(!view.is_loading);
    match view.status {
        SessionStatus::Authenticated => {
            prop_assert!(view.identity.is_some());
            prop_assert!(stored.is_some());
        }
        SessionStatus::Unknown | SessionStatus::Unauthenticated => {
            prop_assert!(view.identity.is_none());
            prop_assert!(view.dashboard.is_none());
            prop_assert!(stored.is_none());
            prop_assert_eq!(view.profile_completion, ProfileCompletion::Unknown);
        }
        other => prop_assert!(false, "session left in {:?}", other),
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever the user does, and whenever startup restore runs, the session
    /// ends every operation settled and internally consistent, and asks the
    /// profile gate at most once per session.
    #[test]
    fn prop_sequences_keep_session_consistent(ops in prop::collection::vec(op(), 1..24)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let store = InMemoryCredentialStore::new();
            let (gateway, session) = session_with(MockSessionGateway::new(), store.clone());
            let mut sessions_with_profile_check = 0usize;

            for op in ops {
                match op {
                    Op::Bootstrap => {
                        let before = session.status();
                        let after = session.bootstrap().await;
                        if before == SessionStatus::Unknown {
                            prop_assert_eq!(after, SessionStatus::Unauthenticated);
                        } else {
                            prop_assert_eq!(after, before);
                        }
                    }
                    Op::Login { accepted } => {
                        if accepted {
                            gateway.set_token("mock-token");
                        } else {
                            gateway.fail_login(GatewayError::invalid_credentials("Invalid credentials"));
                        }
                        let result = session.login(&login_request()).await;
                        prop_assert_eq!(result.is_ok(), accepted);
                        if accepted {
                            sessions_with_profile_check += 1;
                        }
                    }
                    Op::Register => {
                        gateway.set_token("mock-token");
                        let request = RegistrationRequest::new("jdoe", "jane@example.com", "pw");
                        let _ = session.register(&request).await;
                    }
                    Op::Logout => session.logout().await,
                    Op::Refresh { dashboard_up } => {
                        if dashboard_up {
                            gateway.succeed_dashboard(MockSessionGateway::sample_snapshot());
                        } else {
                            gateway.fail_dashboard(GatewayError::Unauthorized);
                        }
                        let was_authenticated = session.status() == SessionStatus::Authenticated;
                        let outcome = session.refresh_snapshot().await;
                        let expected = match (was_authenticated, dashboard_up) {
                            (false, _) => RefreshOutcome::Skipped,
                            (true, true) => RefreshOutcome::Refreshed,
                            (true, false) => RefreshOutcome::SessionEnded,
                        };
                        prop_assert_eq!(outcome, expected);
                    }
                    Op::CheckProfile => {
                        let authenticated = session.status() == SessionStatus::Authenticated;
                        let before = gateway.calls(GatewayOp::ProfileCompletion);
                        let check = session.check_profile_completion().await;
                        if !authenticated {
                            prop_assert!(!check.requires_completion);
                            prop_assert_eq!(gateway.calls(GatewayOp::ProfileCompletion), before);
                        } else if gateway.calls(GatewayOp::ProfileCompletion) > before {
                            sessions_with_profile_check += 1;
                        }
                    }
                    Op::ProfileRequired(required) => gateway.set_profile_requirement(required),
                }

                let view = session.snapshot();
                let stored = store.current().await;
                check_consistent(&view, stored.as_ref())?;
                prop_assert_eq!(
                    gateway.calls(GatewayOp::ProfileCompletion),
                    sessions_with_profile_check
                );
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
