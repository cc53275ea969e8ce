//! Session gateway port - the remote calls the session core depends on.
//!
//! The core never talks HTTP itself. It hands requests and the current
//! credential to a `SessionGateway` and reacts to the typed result.
//!
//! # Error contract
//!
//! | Operation                  | Errors                                    |
//! |----------------------------|-------------------------------------------|
//! | `authenticate`             | `InvalidCredentials`, `Network`           |
//! | `register`                 | `Validation`, `Network`                   |
//! | `fetch_dashboard_snapshot` | `Unauthorized`, `Network`                 |
//! | `fetch_profile_completion` | `Network` (`Unauthorized` is tolerated)   |
//! | `logout`                   | any; the core logs and ignores them       |

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::foundation::FieldErrors;
use crate::domain::session::{Credential, DashboardSnapshot, UserIdentity};

/// Errors reported by a session gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Username/password rejected. Shown to the user verbatim.
    #[error("{0}")]
    InvalidCredentials(String),

    /// Registration form rejected, per field.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// The credential is missing, invalid or expired.
    #[error("Session is no longer authorized")]
    Unauthorized,

    /// The API could not be reached or answered unexpectedly.
    #[error("Network error: {0}")]
    Network(String),
}

impl GatewayError {
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::InvalidCredentials(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Returns true if the error means the stored credential is useless.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, GatewayError::Unauthorized)
    }

    /// Returns true if the same call may succeed when the user retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Network(_))
    }

    /// Returns true for errors meant to be displayed on a form.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            GatewayError::InvalidCredentials(_) | GatewayError::Validation(_)
        )
    }
}

/// Sign-in form contents.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// Username or email address.
    pub username: String,
    password: Secret<String>,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Secret::new(password.into()),
        }
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

/// Sign-up form contents.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    password: Secret<String>,
    password_confirm: Secret<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub date_of_birth: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,

    /// Optional profile fields (employment, emergency contact, preferences)
    /// forwarded to the API as-is.
    pub extra: Map<String, Value>,
}

impl RegistrationRequest {
    /// Creates a request with the credentials filled in and every other
    /// field empty. The password is used for the confirmation too.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            username: username.into(),
            email: email.into(),
            password_confirm: Secret::new(password.clone()),
            password: Secret::new(password),
            first_name: String::new(),
            last_name: String::new(),
            phone_number: String::new(),
            date_of_birth: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            extra: Map::new(),
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// Overrides the confirmation, e.g. to submit exactly what the user typed.
    pub fn with_password_confirm(mut self, confirm: impl Into<String>) -> Self {
        self.password_confirm = Secret::new(confirm.into());
        self
    }

    pub fn with_extra(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(field.into(), value.into());
        self
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    pub fn password_confirm(&self) -> &str {
        self.password_confirm.expose_secret()
    }
}

/// Successful login or registration.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub credential: Credential,
    pub identity: UserIdentity,
    pub message: String,
    pub kyc_required: bool,
    /// The API's own routing hint; the core decides the step it reports.
    pub server_next_step: Option<String>,
}

/// Profile completion status as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCompletionStatus {
    pub requires_completion: bool,
    pub next_step: Option<String>,
}

/// Remote calls backing the session lifecycle.
///
/// Implementations must be stateless with respect to the credential: the
/// core passes it explicitly to every call that needs one.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// Exchange username/password for a credential and identity.
    async fn authenticate(&self, request: &LoginRequest) -> Result<AuthResponse, GatewayError>;

    /// Create an account and sign it in.
    async fn register(&self, request: &RegistrationRequest) -> Result<AuthResponse, GatewayError>;

    /// Fetch the aggregate dashboard read model.
    async fn fetch_dashboard_snapshot(
        &self,
        credential: &Credential,
    ) -> Result<DashboardSnapshot, GatewayError>;

    /// Ask whether the user still has to complete onboarding.
    async fn fetch_profile_completion(
        &self,
        credential: &Credential,
    ) -> Result<ProfileCompletionStatus, GatewayError>;

    /// Invalidate the credential server-side. Best effort.
    async fn logout(&self, credential: &Credential) -> Result<(), GatewayError>;
}
