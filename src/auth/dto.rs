use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Role, User};

/// Request body for signup. Deliberately an allow-list: there is no `role`
/// field, so a client-submitted role is dropped at deserialization.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Request body for login. Fields are optional so a missing one lands in
/// the same `InvalidCredentials` class as a wrong one, not a schema error.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password_current: String,
    pub password: String,
    pub password_confirm: String,
}

/// Public part of the user returned to clients.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthData {
    pub user: PublicUser,
}

/// Response returned after signup, login and the password-change flows.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub status: &'static str,
    pub token: String,
    pub data: AuthData,
}

impl AuthResponse {
    pub fn new(token: String, user: &User) -> Self {
        Self {
            status: "success",
            token,
            data: AuthData { user: user.into() },
        }
    }
}

/// Envelope for operations with no payload beyond an acknowledgement.
#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub status: &'static str,
    pub message: String,
}

impl StatusMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: Some("Jo".into()),
            email: "jo@example.com".into(),
            password_hash: "$argon2id$secret-hash".into(),
            role: Role::User,
            password_changed_at: None,
            password_reset_token_hash: None,
            password_reset_expires_at: None,
            active: true,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn auth_response_carries_token_and_user_without_password() {
        let user = sample_user();
        let response = AuthResponse::new("header.payload.sig".into(), &user);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"token\":\"header.payload.sig\""));
        assert!(json.contains("\"user\""));
        assert!(json.contains("jo@example.com"));
        assert!(!json.contains("password"));
        assert!(!json.contains("secret-hash"));
    }

    #[test]
    fn signup_request_ignores_a_submitted_role() {
        let body = r#"{
            "name": "Mallory",
            "email": "mallory@example.com",
            "password": "secret123",
            "password_confirm": "secret123",
            "role": "admin"
        }"#;
        // The allow-list has no role field; the value is dropped.
        let parsed: SignupRequest = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.email, "mallory@example.com");
    }

    #[test]
    fn login_request_tolerates_missing_fields() {
        let parsed: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(parsed.email.is_none());
        assert!(parsed.password.is_none());
    }
}
