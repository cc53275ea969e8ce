//! SessionStatus enum tracking the authentication lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle status of the dashboard session.
///
/// ```text
/// Unknown ──► Unauthenticated ──► Authenticating ──► Authenticated
///    │                ▲                 │                 │
///    └────────────────┴─────────────────┴─────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// The stored credential has not been inspected yet.
    #[default]
    Unknown,
    Unauthenticated,
    /// A login or registration call is in flight.
    Authenticating,
    /// Identity is loaded; the dashboard snapshot is present or pending.
    Authenticated,
}

impl SessionStatus {
    /// Returns true once the initial credential check has resolved.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, SessionStatus::Unknown)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionStatus::Authenticated)
    }
}

impl StateMachine for SessionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionStatus::*;
        matches!(
            (self, target),
            (Unknown, Unauthenticated)
                | (Unknown, Authenticating)
                | (Unknown, Authenticated)
                | (Unauthenticated, Authenticating)
                | (Authenticating, Authenticated)
                | (Authenticating, Unauthenticated)
                | (Authenticated, Unauthenticated)
                | (Authenticated, Authenticating)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionStatus::*;
        match self {
            Unknown => vec![Unauthenticated, Authenticating, Authenticated],
            Unauthenticated => vec![Authenticating],
            Authenticating => vec![Authenticated, Unauthenticated],
            Authenticated => vec![Unauthenticated, Authenticating],
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Unknown => "Unknown",
            SessionStatus::Unauthenticated => "Unauthenticated",
            SessionStatus::Authenticating => "Authenticating",
            SessionStatus::Authenticated => "Authenticated",
        };
        write!(f, "{}", s)
    }
}
