//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, the state machine trait and the
//! validation error type used across the session domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{clean_message, FieldErrors};
pub use ids::{SessionEpoch, UserId};
pub use state_machine::{InvalidTransition, StateMachine};
pub use timestamp::Timestamp;
