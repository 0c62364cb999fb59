use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        authorize,
        dto::PublicUser,
        handlers::is_valid_email,
        repo::{Role, User},
        CurrentUser,
    },
    error::ApiError,
    state::AppState,
};

use super::dto::{AdminUpdateUserRequest, Pagination, UpdateMeRequest};

pub fn me_routes() -> Router<AppState> {
    Router::new().route(
        "/users/me",
        get(get_me).patch(update_me).delete(delete_me),
    )
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).patch(admin_update_user).delete(admin_delete_user),
        )
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateMeRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    if payload.password.is_some() || payload.password_confirm.is_some() {
        return Err(ApiError::Validation(
            "This route is not for password updates. Please use /auth/update-password".into(),
        ));
    }

    let email = match payload.email.as_deref() {
        Some(e) => {
            let normalized = e.trim().to_lowercase();
            if !is_valid_email(&normalized) {
                warn!(email = %normalized, "invalid email");
                return Err(ApiError::Validation("Please provide a valid email".into()));
            }
            Some(normalized)
        }
        None => None,
    };

    let updated =
        User::update_profile(&state.db, user.id, payload.name.as_deref(), email.as_deref())
            .await?;
    info!(user_id = %updated.id, "profile updated");
    Ok(Json(PublicUser::from(&updated)))
}

#[instrument(skip(state))]
pub async fn delete_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError> {
    User::deactivate(&state.db, user.id).await?;
    info!(user_id = %user.id, "account deactivated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    authorize(current.role, &[Role::Admin])?;
    let users = User::list(&state.db, p.limit, p.offset).await?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, ApiError> {
    authorize(current.role, &[Role::Admin])?;
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No user found with that ID".into()))?;
    Ok(Json(PublicUser::from(&user)))
}

#[instrument(skip(state, payload))]
pub async fn admin_update_user(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    authorize(current.role, &[Role::Admin])?;

    let user = User::admin_update(
        &state.db,
        id,
        payload.name.as_deref(),
        payload.email.as_deref(),
        payload.role,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("No user found with that ID".into()))?;

    info!(user_id = %user.id, role = %user.role, admin_id = %current.id, "user updated by admin");
    Ok(Json(PublicUser::from(&user)))
}

#[instrument(skip(state))]
pub async fn admin_delete_user(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    authorize(current.role, &[Role::Admin])?;
    let deleted = User::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("No user found with that ID".into()));
    }
    info!(user_id = %id, admin_id = %current.id, "user deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}
