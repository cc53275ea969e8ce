//! Session domain - credential, identity, dashboard read model and the
//! lifecycle/profile-completion vocabulary the session core works with.

mod credential;
mod identity;
mod profile;
mod snapshot;
mod status;

pub use credential::Credential;
pub use identity::UserIdentity;
pub use profile::{NextStep, ProfileCheck, ProfileCompletion};
pub use snapshot::{DashboardSnapshot, FinancialSummary};
pub use status::SessionStatus;
