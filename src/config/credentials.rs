//! Credential storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;
use crate::adapters::FileCredentialStore;

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
    /// File holding the persisted credential
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl CredentialsConfig {
    pub fn store(&self) -> FileCredentialStore {
        FileCredentialStore::new(&self.path)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("credentials.path"));
        }
        Ok(())
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from(".dominion/credential.json")
}
