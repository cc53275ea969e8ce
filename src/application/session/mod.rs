//! Session core - lifecycle, profile gate and route guard.

mod error;
mod manager;
mod profile_gate;
mod route_guard;
mod view;

pub use error::SessionError;
pub use manager::SessionManager;
pub use profile_gate::ProfileGate;
pub use route_guard::{GuardDecision, Route, RouteGuard};
pub use view::{AuthOutcome, RefreshOutcome, SessionView};
