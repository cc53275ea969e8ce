//! Errors surfaced by the session core to its consumers.

use thiserror::Error;

use crate::ports::{CredentialStoreError, GatewayError};

/// Failure of `login` or `register`, the only session operations that
/// report errors to the caller.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The gateway rejected the call; the original error is kept intact.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The credential could not be persisted.
    #[error("Credential storage failed: {0}")]
    Storage(#[from] CredentialStoreError),

    /// A logout or a newer login ended the session this call belonged to
    /// before its result could be applied.
    #[error("Session changed before the request completed")]
    Superseded,
}

impl SessionError {
    /// The originating gateway error, if that is what failed.
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            SessionError::Gateway(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true for errors meant to be displayed on the form.
    pub fn is_user_facing(&self) -> bool {
        self.gateway_error().is_some_and(GatewayError::is_user_facing)
    }
}
