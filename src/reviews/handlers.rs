use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{authorize, CurrentUser, Role},
    error::ApiError,
    state::AppState,
};

use super::dto::{CreateReviewRequest, Pagination};
use super::repo::Review;

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list_reviews).post(create_review))
        .route("/reviews/:id", get(get_review).delete(delete_review))
}

#[instrument(skip_all)]
pub async fn list_reviews(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = Review::list(&state.db, p.limit, p.offset).await?;
    Ok(Json(reviews))
}

#[instrument(skip_all)]
pub async fn get_review(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Review>, ApiError> {
    let review = Review::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No review found with that ID".into()))?;
    Ok(Json(review))
}

#[instrument(skip(state, payload))]
pub async fn create_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    // Only plain users write reviews; guides and admins run the tours.
    authorize(user.role, &[Role::User])?;

    if !(1..=5).contains(&payload.rating) {
        return Err(ApiError::Validation("Rating must be between 1 and 5".into()));
    }
    if payload.body.trim().is_empty() {
        return Err(ApiError::Validation("Review body must not be empty".into()));
    }

    // The author is always the requester, never taken from the body.
    let review =
        Review::create(&state.db, payload.tour_id, user.id, payload.rating, &payload.body)
            .await?;
    info!(review_id = %review.id, user_id = %user.id, "review created");
    Ok((StatusCode::CREATED, Json(review)))
}

#[instrument(skip(state))]
pub async fn delete_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    authorize(user.role, &[Role::User, Role::Admin])?;

    let review = Review::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No review found with that ID".into()))?;

    // Users may only remove their own reviews; admins may remove any.
    if user.role != Role::Admin && review.user_id != user.id {
        return Err(ApiError::Forbidden);
    }

    Review::delete(&state.db, id).await?;
    info!(review_id = %id, user_id = %user.id, "review deleted");
    Ok(StatusCode::NO_CONTENT)
}
