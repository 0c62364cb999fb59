use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::jwt::JwtKeys;
use super::repo_types::{Role, User};
use crate::error::ApiError;
use crate::state::AppState;

/// Requester identity resolved by the access-control extractor. Every
/// protected handler takes this; construction runs the full check chain
/// and each failing step rejects immediately with 401.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // 1. Bearer token out of the Authorization header
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthenticated(
                "You are not logged in. Please log in to get access",
            ))?;
        let token = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthenticated(
            "You are not logged in. Please log in to get access",
        ))?;

        // 2. Signature and expiry
        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "token rejected");
            ApiError::Unauthenticated("Invalid or expired token")
        })?;

        // 3. The subject must still exist and be active
        let user = User::find_by_id(&state.db, claims.sub)
            .await
            .map_err(ApiError::Internal)?
            .ok_or(ApiError::Unauthenticated(
                "The user belonging to this token no longer exists",
            ))?;

        // 4. Tokens issued before the last password change are stale,
        //    whatever their own expiry says
        if user.changed_password_after(claims.iat as i64) {
            warn!(user_id = %user.id, "token predates password change");
            return Err(ApiError::Unauthenticated(
                "Password was recently changed. Please log in again",
            ));
        }

        Ok(CurrentUser(user))
    }
}

/// Role gate, composed after `CurrentUser` inside protected handlers.
/// Pure predicate: no I/O, no state.
pub fn authorize(role: Role, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use jsonwebtoken::{encode, Header};
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::auth::claims::Claims;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/users/me");
        if let Some(v) = value {
            builder = builder.header(axum::http::header::AUTHORIZATION, v);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn missing_header_is_rejected_before_anything_else() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(None);
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("must reject");
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("must reject");
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("Bearer not-a-jwt"));
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("must reject");
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: (now - 7200) as usize,
            exp: (now - 3600) as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        let header = format!("Bearer {token}");
        let mut parts = parts_with_auth(Some(&header));
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("must reject");
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }

    #[test]
    fn gate_admits_listed_roles_only() {
        assert!(authorize(Role::Admin, &[Role::Admin, Role::LeadGuide]).is_ok());
        assert!(authorize(Role::LeadGuide, &[Role::Admin, Role::LeadGuide]).is_ok());
        let err = authorize(Role::User, &[Role::Admin, Role::LeadGuide]).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
        let err = authorize(Role::Guide, &[Role::Admin]).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }
}
