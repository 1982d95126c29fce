use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::delivery::http::v1::middleware::require_role;
use crate::domain::booking::{BookingDetails, BookingStatus};
use crate::domain::user::{AuthContext, UserRole};
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub car_id: Uuid,
    pub car_brand: String,
    pub car_model: String,
    pub renter_id: Uuid,
    pub renter_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: i64,
    pub status: BookingStatus,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub car_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Deserialize)]
pub struct UpdateBookingRequest {
    pub car_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Deserialize)]
pub struct AcceptOrRejectRequest {
    pub status: String,
}

fn booking_to_response(d: BookingDetails) -> BookingResponse {
    let today = Utc::now().date_naive();
    BookingResponse {
        id: d.booking.id,
        car_id: d.booking.car_id,
        car_brand: d.car_brand,
        car_model: d.car_model,
        renter_id: d.booking.renter_id,
        renter_name: d.renter_name,
        start_date: d.booking.start_date,
        end_date: d.booking.end_date,
        total_price: d.booking.total_price,
        status: d.booking.effective_status(today),
    }
}

#[tracing::instrument(skip(state), fields(user_id = %ctx.user_id))]
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling list bookings request");

    let bookings = state.bookings_usecase.get_all().await?;
    let response: Vec<BookingResponse> = bookings.into_iter().map(booking_to_response).collect();

    tracing::debug!(count = response.len(), "bookings listed successfully");
    Ok((StatusCode::OK, Json(response)))
}

#[tracing::instrument(skip(state), fields(user_id = %ctx.user_id, %booking_id))]
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling get booking request");

    let details = state.bookings_usecase.get_booking(booking_id).await?;

    Ok((StatusCode::OK, Json(booking_to_response(details))))
}

#[tracing::instrument(skip(state, payload), fields(user_id = %ctx.user_id))]
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling create booking request");

    let result = state
        .bookings_usecase
        .create_booking(ctx, payload.car_id, payload.start_date, payload.end_date)
        .await;

    if matches!(result, Err(UsecaseError::Conflict(_))) {
        metrics::counter!("booking_conflicts_total").increment(1);
    }
    let details = result?;
    metrics::counter!("bookings_created_total").increment(1);

    tracing::debug!(booking_id = %details.booking.id, "booking created successfully");
    Ok((StatusCode::CREATED, Json(booking_to_response(details))))
}

#[tracing::instrument(skip(state, payload), fields(user_id = %ctx.user_id, %booking_id))]
pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<UpdateBookingRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling update booking request");

    let result = state
        .bookings_usecase
        .update_booking(
            ctx,
            booking_id,
            payload.car_id,
            payload.start_date,
            payload.end_date,
        )
        .await;

    if matches!(result, Err(UsecaseError::Conflict(_))) {
        metrics::counter!("booking_conflicts_total").increment(1);
    }
    let details = result?;

    tracing::debug!("booking updated successfully");
    Ok((StatusCode::OK, Json(booking_to_response(details))))
}

#[tracing::instrument(skip(state), fields(user_id = %ctx.user_id, %booking_id))]
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling delete booking request");

    let details = state.bookings_usecase.cancel_booking(ctx, booking_id).await?;
    metrics::counter!("bookings_cancelled_total").increment(1);

    tracing::debug!("booking cancelled successfully");
    Ok((StatusCode::OK, Json(booking_to_response(details))))
}

#[tracing::instrument(skip(state, payload), fields(user_id = %ctx.user_id, %booking_id))]
pub async fn accept_or_reject_booking(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<AcceptOrRejectRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!(status = %payload.status, "handling accept-or-reject request");

    let requested: BookingStatus = payload
        .status
        .parse()
        .map_err(|_| UsecaseError::Validation("Invalid booking status".to_string()))?;

    let details = state
        .bookings_usecase
        .accept_or_reject(ctx, booking_id, requested)
        .await?;

    tracing::debug!("booking decided successfully");
    Ok((StatusCode::OK, Json(booking_to_response(details))))
}

#[tracing::instrument(skip(state), fields(user_id = %ctx.user_id))]
pub async fn user_history(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling renter history request");

    require_role(&ctx, UserRole::User)?;

    let bookings = state.bookings_usecase.user_history(ctx).await?;
    let response: Vec<BookingResponse> = bookings.into_iter().map(booking_to_response).collect();

    tracing::debug!(count = response.len(), "renter history retrieved successfully");
    Ok((StatusCode::OK, Json(response)))
}

#[tracing::instrument(skip(state), fields(user_id = %ctx.user_id))]
pub async fn owner_history(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling owner history request");

    require_role(&ctx, UserRole::Owner)?;

    let bookings = state.bookings_usecase.owner_history(ctx).await?;
    let response: Vec<BookingResponse> = bookings.into_iter().map(booking_to_response).collect();

    tracing::debug!(count = response.len(), "owner history retrieved successfully");
    Ok((StatusCode::OK, Json(response)))
}
