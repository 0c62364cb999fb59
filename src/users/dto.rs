use serde::Deserialize;

use crate::auth::Role;

/// Allow-list for profile self-service. Password fields are declared only
/// so their presence can be rejected with a pointer at update-password.
#[derive(Debug, Deserialize)]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

/// Admin-only user update. The only place in the API where a role can be
/// assigned.
#[derive(Debug, Deserialize)]
pub struct AdminUpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_me_surfaces_password_fields_for_rejection() {
        let body = r#"{"name":"Jo","password":"sneaky12"}"#;
        let parsed: UpdateMeRequest = serde_json::from_str(body).unwrap();
        assert!(parsed.password.is_some());
        assert!(parsed.password_confirm.is_none());
    }

    #[test]
    fn admin_update_accepts_kebab_case_role() {
        let body = r#"{"role":"lead-guide"}"#;
        let parsed: AdminUpdateUserRequest = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.role, Some(Role::LeadGuide));
    }

    #[test]
    fn pagination_defaults() {
        let parsed: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.limit, 20);
        assert_eq!(parsed.offset, 0);
    }
}
