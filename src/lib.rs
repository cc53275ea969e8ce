//! Dominion Session - session lifecycle and access gating for the Dominion
//! banking dashboard.
//!
//! The crate resolves who is signed in from a persisted credential, runs
//! login, registration and logout against the dashboard API, keeps the
//! dashboard snapshot current, and decides whether a protected screen may
//! render or must redirect.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
