//! Wire DTOs for the dashboard API.
//!
//! These types decouple the port types from the JSON bodies the API
//! speaks, so field renames stay local to the adapter.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::session::{Credential, UserIdentity};
use crate::ports::{AuthResponse, LoginRequest, ProfileCompletionStatus, RegistrationRequest};

/// Body of `POST /api/auth/login/`.
#[derive(Debug, Serialize)]
pub struct LoginBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a LoginRequest> for LoginBody<'a> {
    fn from(request: &'a LoginRequest) -> Self {
        Self {
            username: &request.username,
            password: request.password(),
        }
    }
}

/// Body of `POST /api/auth/register/`.
#[derive(Debug, Serialize)]
pub struct RegisterBody<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub password_confirm: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone_number: &'a str,
    pub date_of_birth: &'a str,
    pub address: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub postal_code: &'a str,
    #[serde(flatten)]
    pub extra: &'a Map<String, Value>,
}

impl<'a> From<&'a RegistrationRequest> for RegisterBody<'a> {
    fn from(request: &'a RegistrationRequest) -> Self {
        Self {
            username: &request.username,
            email: &request.email,
            password: request.password(),
            password_confirm: request.password_confirm(),
            first_name: &request.first_name,
            last_name: &request.last_name,
            phone_number: &request.phone_number,
            date_of_birth: &request.date_of_birth,
            address: &request.address,
            city: &request.city,
            state: &request.state,
            postal_code: &request.postal_code,
            extra: &request.extra,
        }
    }
}

/// Response of login and registration.
#[derive(Debug, Deserialize)]
pub struct AuthResponseDto {
    pub user: UserIdentity,
    pub token: Credential,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub kyc_required: bool,
    #[serde(default)]
    pub next_step: Option<String>,
}

impl From<AuthResponseDto> for AuthResponse {
    fn from(dto: AuthResponseDto) -> Self {
        Self {
            credential: dto.token,
            identity: dto.user,
            message: dto.message,
            kyc_required: dto.kyc_required,
            server_next_step: dto.next_step,
        }
    }
}

/// Response of `GET /api/auth/profile/complete/`.
///
/// The endpoint also returns the current profile data and the list of
/// completable fields; only the requirement flag matters to the gate.
#[derive(Debug, Deserialize)]
pub struct ProfileCompletionDto {
    pub requires_completion: bool,
    #[serde(default)]
    pub next_step: Option<String>,
}

impl From<ProfileCompletionDto> for ProfileCompletionStatus {
    fn from(dto: ProfileCompletionDto) -> Self {
        Self {
            requires_completion: dto.requires_completion,
            next_step: dto.next_step,
        }
    }
}

/// Pulls the human-readable message out of an error body.
pub fn error_message(body: &Value) -> Option<String> {
    ["error", "detail", "message"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_body_serializes_credentials() {
        let request = LoginRequest::new("jdoe", "pw");
        let json = serde_json::to_value(LoginBody::from(&request)).unwrap();

        assert_eq!(json, json!({ "username": "jdoe", "password": "pw" }));
    }

    #[test]
    fn register_body_flattens_extra_fields() {
        let request = RegistrationRequest::new("jdoe", "jane@example.com", "pw")
            .with_name("Jane", "Doe")
            .with_extra("sms_notifications", true);
        let json = serde_json::to_value(RegisterBody::from(&request)).unwrap();

        assert_eq!(json["password_confirm"], json!("pw"));
        assert_eq!(json["first_name"], json!("Jane"));
        assert_eq!(json["sms_notifications"], json!(true));
    }

    #[test]
    fn auth_response_maps_token_and_hint() {
        let dto: AuthResponseDto = serde_json::from_value(json!({
            "user": { "id": 1, "email": "jane@example.com" },
            "token": "abc123",
            "message": "Login successful",
            "kyc_required": false,
            "next_step": "document_upload"
        }))
        .unwrap();
        let response = AuthResponse::from(dto);

        assert_eq!(response.credential, Credential::new("abc123"));
        assert_eq!(response.server_next_step.as_deref(), Some("document_upload"));
        assert_eq!(response.message, "Login successful");
    }

    #[test]
    fn profile_completion_ignores_extra_payload() {
        let dto: ProfileCompletionDto = serde_json::from_value(json!({
            "requires_completion": true,
            "current_data": { "username": "jdoe_1234" },
            "completion_fields": {}
        }))
        .unwrap();

        assert!(ProfileCompletionStatus::from(dto).requires_completion);
    }

    #[test]
    fn error_message_checks_known_keys_in_order() {
        assert_eq!(
            error_message(&json!({ "detail": "Invalid token." })).as_deref(),
            Some("Invalid token.")
        );
        assert_eq!(
            error_message(&json!({ "error": "a", "detail": "b" })).as_deref(),
            Some("a")
        );
        assert_eq!(error_message(&json!({ "other": 1 })), None);
    }
}
