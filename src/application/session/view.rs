//! Read-only values the session core hands to consumers.

use std::sync::Arc;

use crate::domain::foundation::SessionEpoch;
use crate::domain::session::{
    DashboardSnapshot, NextStep, ProfileCompletion, SessionStatus, UserIdentity,
};

/// Point-in-time copy of the session state.
#[derive(Debug, Clone, Default)]
pub struct SessionView {
    pub status: SessionStatus,
    /// True while the startup credential check is in flight.
    pub is_loading: bool,
    pub identity: Option<UserIdentity>,
    pub dashboard: Option<Arc<DashboardSnapshot>>,
    pub profile_completion: ProfileCompletion,
    pub epoch: SessionEpoch,
}

impl SessionView {
    pub fn is_authenticated(&self) -> bool {
        self.status.is_authenticated()
    }

    /// True until the session has settled on a status consumers can act on.
    pub fn is_pending(&self) -> bool {
        self.is_loading
            || matches!(
                self.status,
                SessionStatus::Unknown | SessionStatus::Authenticating
            )
    }
}

/// Successful `login` or `register`.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub identity: UserIdentity,
    /// Where the caller should route the user.
    pub next_step: NextStep,
    /// False when the dashboard was not loaded (onboarding pending, or the
    /// load failed and was degraded to a warning).
    pub snapshot_loaded: bool,
    /// Server greeting, e.g. "Login successful".
    pub message: String,
    pub kyc_required: bool,
}

/// What `refresh_snapshot` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Not authenticated; nothing was fetched.
    Skipped,
    Refreshed,
    /// The fetch failed and the session was cleared.
    SessionEnded,
    /// The session changed while the fetch was pending; its result was dropped.
    Discarded,
}
