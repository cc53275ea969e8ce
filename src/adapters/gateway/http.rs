//! HTTP adapter for the dashboard API.
//!
//! Implements the `SessionGateway` port against the REST endpoints under
//! `/api/auth/`. Requests carry the credential as `Authorization: Token <t>`.
//!
//! # Status mapping
//!
//! - login: 400/401/403 → `InvalidCredentials` (server message kept)
//! - register: 400 → `Validation` (per-field messages)
//! - dashboard, profile, logout: 401/403 → `Unauthorized`
//! - anything else non-2xx, transport failures, undecodable bodies → `Network`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::dto::{
    error_message, AuthResponseDto, LoginBody, ProfileCompletionDto, RegisterBody,
};
use crate::domain::foundation::{clean_message, FieldErrors, Timestamp};
use crate::domain::session::{Credential, DashboardSnapshot};
use crate::ports::{
    AuthResponse, GatewayError, LoginRequest, ProfileCompletionStatus, RegistrationRequest,
    SessionGateway,
};

const LOGIN_PATH: &str = "/api/auth/login/";
const REGISTER_PATH: &str = "/api/auth/register/";
const LOGOUT_PATH: &str = "/api/auth/logout/";
const DASHBOARD_PATH: &str = "/api/auth/dashboard/";
const PROFILE_COMPLETION_PATH: &str = "/api/auth/profile/complete/";

const DEFAULT_INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Configuration for the HTTP gateway.
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// API origin, e.g. `https://api.dominionbank.example`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpGatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `SessionGateway` speaking JSON over HTTP(S).
pub struct HttpSessionGateway {
    config: HttpGatewayConfig,
    client: Client,
}

impl HttpSessionGateway {
    /// Creates a gateway with its own connection pool.
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, builder: RequestBuilder, credential: &Credential) -> RequestBuilder {
        builder.header(
            reqwest::header::AUTHORIZATION,
            format!("Token {}", credential.expose()),
        )
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> Result<Response, GatewayError> {
        tracing::debug!(path, "Sending API request");

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::network(format!(
                    "Request timed out after {}s",
                    self.config.timeout.as_secs()
                ))
            } else if e.is_connect() {
                GatewayError::network(format!("Connection failed: {}", e))
            } else {
                GatewayError::network(e.to_string())
            }
        })?;

        tracing::debug!(path, status = %response.status(), "API responded");
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::network(format!("Invalid response body: {}", e)))
    }

    async fn error_body(response: Response) -> Value {
        response.json::<Value>().await.unwrap_or(Value::Null)
    }

    fn unexpected(status: StatusCode, body: &Value) -> GatewayError {
        match error_message(body) {
            Some(message) => GatewayError::network(format!("HTTP {}: {}", status.as_u16(), message)),
            None => GatewayError::network(format!("HTTP error! status: {}", status.as_u16())),
        }
    }

    fn is_auth_failure(status: StatusCode) -> bool {
        matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
    }
}

#[async_trait]
impl SessionGateway for HttpSessionGateway {
    async fn authenticate(&self, request: &LoginRequest) -> Result<AuthResponse, GatewayError> {
        let builder = self
            .client
            .post(self.url(LOGIN_PATH))
            .json(&LoginBody::from(request));
        let response = self.send(builder, LOGIN_PATH).await?;
        let status = response.status();

        if status.is_success() {
            let dto: AuthResponseDto = Self::decode(response).await?;
            return Ok(dto.into());
        }

        let body = Self::error_body(response).await;
        if status == StatusCode::BAD_REQUEST || Self::is_auth_failure(status) {
            let message = error_message(&body)
                .map(|m| clean_message(&m))
                .unwrap_or_else(|| DEFAULT_INVALID_CREDENTIALS.to_string());
            return Err(GatewayError::InvalidCredentials(message));
        }
        Err(Self::unexpected(status, &body))
    }

    async fn register(&self, request: &RegistrationRequest) -> Result<AuthResponse, GatewayError> {
        let builder = self
            .client
            .post(self.url(REGISTER_PATH))
            .json(&RegisterBody::from(request));
        let response = self.send(builder, REGISTER_PATH).await?;
        let status = response.status();

        if status.is_success() {
            let dto: AuthResponseDto = Self::decode(response).await?;
            return Ok(dto.into());
        }

        let body = Self::error_body(response).await;
        if status == StatusCode::BAD_REQUEST {
            return Err(GatewayError::Validation(FieldErrors::from_response_body(&body)));
        }
        Err(Self::unexpected(status, &body))
    }

    async fn fetch_dashboard_snapshot(
        &self,
        credential: &Credential,
    ) -> Result<DashboardSnapshot, GatewayError> {
        let builder = self.authorized(self.client.get(self.url(DASHBOARD_PATH)), credential);
        let response = self.send(builder, DASHBOARD_PATH).await?;
        let status = response.status();

        if status.is_success() {
            let mut snapshot: DashboardSnapshot = Self::decode(response).await?;
            snapshot.received_at = Timestamp::now();
            return Ok(snapshot);
        }
        if Self::is_auth_failure(status) {
            return Err(GatewayError::Unauthorized);
        }
        let body = Self::error_body(response).await;
        Err(Self::unexpected(status, &body))
    }

    async fn fetch_profile_completion(
        &self,
        credential: &Credential,
    ) -> Result<ProfileCompletionStatus, GatewayError> {
        let builder = self.authorized(
            self.client.get(self.url(PROFILE_COMPLETION_PATH)),
            credential,
        );
        let response = self.send(builder, PROFILE_COMPLETION_PATH).await?;
        let status = response.status();

        if status.is_success() {
            let dto: ProfileCompletionDto = Self::decode(response).await?;
            return Ok(dto.into());
        }
        if Self::is_auth_failure(status) {
            return Err(GatewayError::Unauthorized);
        }
        let body = Self::error_body(response).await;
        Err(Self::unexpected(status, &body))
    }

    async fn logout(&self, credential: &Credential) -> Result<(), GatewayError> {
        let builder = self.authorized(self.client.post(self.url(LOGOUT_PATH)), credential);
        let response = self.send(builder, LOGOUT_PATH).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }
        if Self::is_auth_failure(status) {
            return Err(GatewayError::Unauthorized);
        }
        let body = Self::error_body(response).await;
        Err(Self::unexpected(status, &body))
    }
}
