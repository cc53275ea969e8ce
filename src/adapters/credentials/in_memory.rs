//! In-Memory Credential Store Adapter
//!
//! Holds the credential in memory. Useful for testing and for consumers
//! that do not want the session to outlive the process.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::session::Credential;
use crate::ports::{CredentialStore, CredentialStoreError};

/// In-memory storage for the credential
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    credential: Arc<RwLock<Option<Credential>>>,
    force_error: Arc<RwLock<Option<CredentialStoreError>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a credential
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: Arc::new(RwLock::new(Some(credential))),
            ..Self::default()
        }
    }

    /// Forces every operation to fail with the given error.
    pub fn with_error(self, error: CredentialStoreError) -> Self {
        if let Ok(mut slot) = self.force_error.try_write() {
            *slot = Some(error);
        }
        self
    }

    /// Makes every later operation fail with the given error.
    pub async fn fail_with(&self, error: CredentialStoreError) {
        *self.force_error.write().await = Some(error);
    }

    /// Clears the forced error.
    pub async fn clear_error(&self) {
        *self.force_error.write().await = None;
    }

    /// Current credential without going through the port
    pub async fn current(&self) -> Option<Credential> {
        self.credential.read().await.clone()
    }

    /// Number of successful `set` and `clear` calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn check_error(&self) -> Result<(), CredentialStoreError> {
        match self.force_error.read().await.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self) -> Result<Option<Credential>, CredentialStoreError> {
        self.check_error().await?;
        Ok(self.credential.read().await.clone())
    }

    async fn set(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
        self.check_error().await?;
        *self.credential.write().await = Some(credential.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        self.check_error().await?;
        *self.credential.write().await = None;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
