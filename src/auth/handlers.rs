use axum::{
    extract::{FromRef, Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{patch, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest,
            SignupRequest, StatusMessage, UpdatePasswordRequest,
        },
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::User,
        reset::{self, ResetToken},
    },
    error::ApiError,
    mailer::EmailMessage,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password/:token", patch(reset_password))
        .route("/auth/update-password", patch(update_password))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_new_password(password: &str, confirm: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }
    if password != confirm {
        return Err(ApiError::Validation("Passwords are not the same".into()));
    }
    Ok(())
}

fn session_cookie(token: &str, ttl_days: i64, secure: bool) -> String {
    let max_age = ttl_days * 24 * 60 * 60;
    let mut cookie = format!("token={token}; Max-Age={max_age}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Issue a session token for `user` and build the shared response shape:
/// JSON envelope with `token` plus the same-named httpOnly cookie.
fn send_token(
    state: &AppState,
    user: &User,
    status: StatusCode,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    let keys = JwtKeys::from_ref(state);
    let token = keys.sign(user.id).map_err(ApiError::Internal)?;

    let cookie = session_cookie(
        &token,
        state.config.jwt.cookie_ttl_days,
        state.config.production,
    );
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        cookie
            .parse()
            .map_err(|e: header::InvalidHeaderValue| ApiError::Internal(e.into()))?,
    );

    Ok((status, headers, Json(AuthResponse::new(token, user))))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Please provide a valid email".into()));
    }
    validate_new_password(&payload.password, &payload.password_confirm)?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict);
    }

    let hash = hash_password(&payload.password).map_err(ApiError::Internal)?;
    let user = User::create(&state.db, payload.name.as_deref(), &payload.email, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "user signed up");
    send_token(&state, &user, StatusCode::CREATED)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    // Missing email, missing password, unknown user and wrong password all
    // collapse into the same rejection.
    let (email, password) = match (payload.email, payload.password) {
        (Some(e), Some(p)) if !e.is_empty() && !p.is_empty() => (e.trim().to_lowercase(), p),
        _ => return Err(ApiError::InvalidCredentials),
    };

    let user = match User::find_by_email(&state.db, &email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let ok = verify_password(&password, &user.password_hash).map_err(ApiError::Internal)?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user logged in");
    send_token(&state, &user, StatusCode::OK)
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<StatusMessage>, ApiError> {
    let email = payload.email.trim().to_lowercase();
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::NotFound("There is no user with that email address".into()))?;

    let token = ResetToken::generate();
    User::set_reset_token(&state.db, user.id, &token.hash, token.expires_at).await?;

    let reset_url = format!(
        "{}/api/v1/auth/reset-password/{}",
        state.config.public_base_url, token.plaintext
    );
    let message = EmailMessage {
        to: user.email.clone(),
        subject: "Your password reset token (valid for 10 minutes)".into(),
        body: format!(
            "Forgot your password? Submit a PATCH request with your new password \
             and password_confirm to: {reset_url}\nIf you didn't forget your \
             password, please ignore this email."
        ),
    };

    if let Err(e) = state.mailer.send(&message).await {
        // The user was never notified, so the token must not stay usable.
        error!(error = %e, user_id = %user.id, "reset email failed, rolling back token");
        User::clear_reset_token(&state.db, user.id).await?;
        return Err(ApiError::Delivery);
    }

    info!(user_id = %user.id, "password reset token sent");
    Ok(Json(StatusMessage::success("Token sent to email")))
}

#[instrument(skip(state, token, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    validate_new_password(&payload.password, &payload.password_confirm)?;

    let user = User::find_by_reset_token(&state.db, &reset::hash_token(&token))
        .await?
        .ok_or(ApiError::InvalidOrExpiredToken)?;

    let hash = hash_password(&payload.password).map_err(ApiError::Internal)?;
    // One UPDATE: new hash, password_changed_at stamp, reset token consumed.
    let user = User::update_password(&state.db, user.id, &hash).await?;

    info!(user_id = %user.id, "password reset");
    send_token(&state, &user, StatusCode::OK)
}

#[instrument(skip(state, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    // Verify against a freshly loaded row, not the extractor's copy.
    let user = User::find_by_id(&state.db, current.id)
        .await?
        .ok_or(ApiError::Unauthenticated(
            "The user belonging to this token no longer exists",
        ))?;

    let ok = verify_password(&payload.password_current, &user.password_hash)
        .map_err(ApiError::Internal)?;
    if !ok {
        warn!(user_id = %user.id, "update-password with wrong current password");
        return Err(ApiError::InvalidCredentials);
    }

    validate_new_password(&payload.password, &payload.password_confirm)?;
    let hash = hash_password(&payload.password).map_err(ApiError::Internal)?;
    let user = User::update_password(&state.db, user.id, &hash).await?;

    info!(user_id = %user.id, "password updated");
    send_token(&state, &user, StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("jo@example.com"));
        assert!(is_valid_email("jo.hiker+tours@example.co.uk"));
        assert!(!is_valid_email("jo@example"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn password_confirm_mismatch_is_a_validation_error() {
        let err = validate_new_password("secret12", "secret123").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn short_password_is_a_validation_error() {
        let err = validate_new_password("short1", "short1").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(validate_new_password("secret12", "secret12").is_ok());
    }

    #[test]
    fn cookie_is_http_only_and_secure_only_in_production() {
        let dev = session_cookie("tok", 90, false);
        assert!(dev.starts_with("token=tok; "));
        assert!(dev.contains("HttpOnly"));
        assert!(dev.contains(&format!("Max-Age={}", 90 * 24 * 60 * 60)));
        assert!(!dev.contains("Secure"));

        let prod = session_cookie("tok", 90, true);
        assert!(prod.contains("HttpOnly"));
        assert!(prod.ends_with("Secure"));
    }
}
