//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the session core to external systems:
//! - `gateway` - Dashboard API (HTTP) and a scriptable mock
//! - `credentials` - Credential persistence (file, in-memory)

pub mod credentials;
pub mod gateway;

pub use credentials::{FileCredentialStore, InMemoryCredentialStore};
pub use gateway::{GatewayOp, HttpGatewayConfig, HttpSessionGateway, MockSessionGateway};
