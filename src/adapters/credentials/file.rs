//! File-based Credential Store Adapter
//!
//! Keeps the credential in a small JSON document on disk so that a restart
//! of the process resumes the previous session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::session::Credential;
use crate::ports::{CredentialStore, CredentialStoreError};

#[derive(Serialize, Deserialize)]
struct StoredCredential {
    token: Credential,
}

/// File-based storage for the credential
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by the given file
    ///
    /// # Example
    /// ```ignore
    /// let store = FileCredentialStore::new("./.dominion/credential.json");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent(&self) -> Result<(), CredentialStoreError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
                .await
                .map_err(|e| CredentialStoreError::IoError(e.to_string())),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self) -> Result<Option<Credential>, CredentialStoreError> {
        let json = match fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CredentialStoreError::IoError(e.to_string())),
        };

        let stored: StoredCredential = serde_json::from_str(&json)
            .map_err(|e| CredentialStoreError::Corrupt(e.to_string()))?;

        if stored.token.is_blank() {
            return Ok(None);
        }
        Ok(Some(stored.token))
    }

    async fn set(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
        self.ensure_parent().await?;

        let json = serde_json::to_string(&StoredCredential {
            token: credential.clone(),
        })
        .map_err(|e| CredentialStoreError::Corrupt(e.to_string()))?;

        // Write to a sibling file first so a crash never leaves half a token.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)
            .await
            .map_err(|e| CredentialStoreError::IoError(e.to_string()))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CredentialStoreError::IoError(e.to_string()))?;

        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CredentialStoreError::IoError(e.to_string())),
        }
    }
}
