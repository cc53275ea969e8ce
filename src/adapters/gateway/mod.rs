//! Session gateway adapters.
//!
//! Implementations of the `SessionGateway` port:
//!
//! - `http` - Production adapter for the dashboard REST API (reqwest)
//! - `mock` - Scriptable in-process implementation for tests

mod dto;
mod http;
mod mock;

pub use http::{HttpGatewayConfig, HttpSessionGateway};
pub use mock::{GatewayOp, MockSessionGateway};
