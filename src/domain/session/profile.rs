//! Profile completion vocabulary: the tri-state gate result and the
//! navigation step it implies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a consumer should send the user next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    /// Onboarding must be finished before protected screens are shown.
    CompleteProfile,
    Dashboard,
}

impl NextStep {
    /// Wire name of the step (`complete_profile`, `dashboard`).
    pub fn as_str(&self) -> &'static str {
        match self {
            NextStep::CompleteProfile => "complete_profile",
            NextStep::Dashboard => "dashboard",
        }
    }
}

impl fmt::Display for NextStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the last profile check for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProfileCompletion {
    /// Not checked yet in this session.
    #[default]
    Unknown,
    Complete,
    Incomplete,
}

impl ProfileCompletion {
    pub fn is_known(&self) -> bool {
        !matches!(self, ProfileCompletion::Unknown)
    }
}

/// Answer of the profile gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCheck {
    pub requires_completion: bool,
    pub next_step: NextStep,

    /// The API could not be reached and the gate let the user through.
    #[serde(default)]
    pub failed_open: bool,
}

impl ProfileCheck {
    /// Maps the API's `requires_completion` flag onto a gate result.
    pub fn from_requirement(requires_completion: bool) -> Self {
        let next_step = if requires_completion {
            NextStep::CompleteProfile
        } else {
            NextStep::Dashboard
        };
        Self {
            requires_completion,
            next_step,
            failed_open: false,
        }
    }

    /// Result for callers that are not signed in: nothing to complete.
    pub fn not_required() -> Self {
        Self::from_requirement(false)
    }

    /// Result used when the check itself failed.
    pub fn fail_open() -> Self {
        Self {
            failed_open: true,
            ..Self::not_required()
        }
    }

    /// Tri-state view of this result.
    pub fn completion(&self) -> ProfileCompletion {
        if self.requires_completion {
            ProfileCompletion::Incomplete
        } else {
            ProfileCompletion::Complete
        }
    }
}
