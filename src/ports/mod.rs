//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the session core and the outside world. Adapters implement these ports.
//!
//! - `SessionGateway` - Remote authentication, dashboard and profile calls
//! - `CredentialStore` - Persistence of the bearer credential

mod credential_store;
mod session_gateway;

pub use credential_store::{CredentialStore, CredentialStoreError};
pub use session_gateway::{
    AuthResponse, GatewayError, LoginRequest, ProfileCompletionStatus, RegistrationRequest,
    SessionGateway,
};
