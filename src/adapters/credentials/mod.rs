//! Credential Store Adapters
//!
//! Implementations of the CredentialStore port.
//!
//! ## Available Adapters
//!
//! - **FileCredentialStore** - Stores the credential as a JSON file on disk
//! - **InMemoryCredentialStore** - Stores the credential in memory (testing/ephemeral sessions)

mod file;
mod in_memory;

pub use file::FileCredentialStore;
pub use in_memory::InMemoryCredentialStore;
