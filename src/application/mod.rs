//! Application layer - orchestrates the domain through the ports.
//!
//! `SessionManager` owns the session state; `RouteGuard` reads it to decide
//! what a protected screen shows.

pub mod session;

pub use session::{
    AuthOutcome, GuardDecision, ProfileGate, RefreshOutcome, Route, RouteGuard, SessionError,
    SessionManager, SessionView,
};
