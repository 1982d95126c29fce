use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::review::Review;
use crate::domain::user::AuthContext;
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub author_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i16,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub comment: String,
}

fn review_to_response(r: Review) -> ReviewResponse {
    ReviewResponse {
        id: r.id,
        booking_id: r.booking_id,
        author_id: r.author_id,
        rating: r.rating,
        comment: r.comment,
        created_at: r.created_at,
    }
}

#[tracing::instrument(skip(state), fields(user_id = %ctx.user_id, %booking_id))]
pub async fn get_booking_review(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling get review request");

    let review = state.reviews_usecase.get_review(booking_id).await?;

    Ok((StatusCode::OK, Json(review_to_response(review))))
}

#[tracing::instrument(skip(state, payload), fields(user_id = %ctx.user_id, %booking_id))]
pub async fn create_booking_review(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling create review request");

    if let Err(validation_errors) = payload.validate() {
        tracing::warn!(user_id = %ctx.user_id, ?validation_errors, "validation failed");
        return Err(UsecaseError::Validation(format!("{:?}", validation_errors)));
    }

    let review = state
        .reviews_usecase
        .create_review(ctx, booking_id, payload.rating, payload.comment)
        .await?;

    tracing::debug!(review_id = %review.id, "review created successfully");
    Ok((StatusCode::CREATED, Json(review_to_response(review))))
}
