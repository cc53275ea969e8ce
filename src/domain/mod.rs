//! Domain layer containing the session vocabulary.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, state machine, field errors)
//! - `session` - Credential, identity, dashboard snapshot, status and profile gate types

pub mod foundation;
pub mod session;
