//! Credential Store Port - persistence for the bearer credential.
//!
//! The credential is the only piece of session state that survives a
//! restart; everything else is rebuilt from the gateway.

use async_trait::async_trait;

use crate::domain::session::Credential;

/// Errors that can occur during credential storage operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum CredentialStoreError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Stored credential is unreadable: {0}")]
    Corrupt(String),
}

/// Port for persisting the credential across restarts.
///
/// Implementations hold at most one credential and do no validation
/// beyond what their storage format requires.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the stored credential, if any.
    async fn get(&self) -> Result<Option<Credential>, CredentialStoreError>;

    /// Replace the stored credential.
    async fn set(&self, credential: &Credential) -> Result<(), CredentialStoreError>;

    /// Remove the stored credential. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<(), CredentialStoreError>;
}
