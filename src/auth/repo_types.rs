use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Access level of an account. Everyone signs up as `User`; the other
/// roles are assigned through the admin user-update route only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "user_role", rename_all = "kebab-case")]
pub enum Role {
    User,
    Guide,
    LeadGuide,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Role::User => "user",
            Role::Guide => "guide",
            Role::LeadGuide => "lead-guide",
            Role::Admin => "admin",
        })
    }
}

/// User record in the database. Credential and lifecycle columns are
/// never serialized; clients only ever see `dto::PublicUser`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_changed_at: Option<OffsetDateTime>,
    #[serde(skip_serializing)]
    pub password_reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub password_reset_expires_at: Option<OffsetDateTime>,
    #[serde(skip_serializing)]
    pub active: bool,
    pub created_at: OffsetDateTime,
}

impl User {
    /// True when the password was changed after the given token issue
    /// time. Strict comparison: a token minted in the same second as the
    /// change stays valid.
    pub fn changed_password_after(&self, token_iat: i64) -> bool {
        match self.password_changed_at {
            Some(changed_at) => changed_at.unix_timestamp() > token_iat,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_changed_at(changed_at: Option<OffsetDateTime>) -> User {
        User {
            id: Uuid::new_v4(),
            name: Some("Jo".into()),
            email: "jo@example.com".into(),
            password_hash: "$argon2id$fake".into(),
            role: Role::User,
            password_changed_at: changed_at,
            password_reset_token_hash: None,
            password_reset_expires_at: None,
            active: true,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn never_changed_password_is_never_stale() {
        let user = user_with_changed_at(None);
        assert!(!user.changed_password_after(0));
        assert!(!user.changed_password_after(i64::MAX - 1));
    }

    #[test]
    fn token_issued_before_change_is_stale() {
        let now = OffsetDateTime::now_utc();
        let user = user_with_changed_at(Some(now));
        assert!(user.changed_password_after(now.unix_timestamp() - 60));
    }

    #[test]
    fn token_issued_at_or_after_change_is_fresh() {
        let now = OffsetDateTime::now_utc();
        let user = user_with_changed_at(Some(now));
        // same second: not stale (strict comparison)
        assert!(!user.changed_password_after(now.unix_timestamp()));
        assert!(!user.changed_password_after(now.unix_timestamp() + 60));
    }

    #[test]
    fn role_round_trips_through_kebab_case() {
        let json = serde_json::to_string(&Role::LeadGuide).unwrap();
        assert_eq!(json, "\"lead-guide\"");
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::LeadGuide);
        assert_eq!(Role::LeadGuide.to_string(), "lead-guide");
    }

    #[test]
    fn user_serialization_hides_credentials() {
        let mut user = user_with_changed_at(None);
        user.password_reset_token_hash = Some("deadbeef".into());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("deadbeef"));
        assert!(!json.contains("active"));
    }
}
