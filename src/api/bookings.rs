//! Booking endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{booking::BookingDetails, booking::BookingStatus, item::ItemRef, user::UserRef},
};

use super::CallerId;

/// Create booking request. Instants are RFC 3339; they are converted to UTC
/// here, once, and the engine never sees wall-clock strings.
#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Item to reserve
    #[validate(range(min = 1, message = "itemId must be positive"))]
    pub item_id: i64,
    /// Start of the reservation window
    pub start: DateTime<Utc>,
    /// End of the reservation window (exclusive of further use)
    pub end: DateTime<Utc>,
}

#[derive(Deserialize, IntoParams)]
pub struct DecideParams {
    /// true approves the booking, false rejects it
    pub approved: bool,
}

#[derive(Deserialize, IntoParams)]
pub struct StateParams {
    /// Listing selector: ALL, CURRENT, PAST, FUTURE, WAITING or REJECTED
    pub state: Option<String>,
}

/// Booking response
#[derive(Serialize, ToSchema)]
pub struct BookingResponse {
    pub id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
    pub booker: UserRef,
    pub item: ItemRef,
}

impl From<BookingDetails> for BookingResponse {
    fn from(details: BookingDetails) -> Self {
        Self {
            id: details.id,
            start: details.start_date,
            end: details.end_date,
            status: details.status,
            booker: details.booker,
            item: details.item,
        }
    }
}

/// Create a booking request for an item.
///
/// Not idempotent: a client retrying after a lost response may create a
/// duplicate booking and owns deduplication.
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    request_body = CreateBookingRequest,
    params(("X-Sharer-User-Id" = i64, Header, description = "Caller user id")),
    responses(
        (status = 201, description = "Booking created in WAITING status", body = BookingResponse),
        (status = 400, description = "Business rule violated", body = crate::error::ErrorResponse),
        (status = 404, description = "User or item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    CallerId(caller): CallerId,
    Json(request): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let booking = state
        .services
        .bookings
        .create_booking(request.item_id, request.start, request.end, caller)
        .await?;

    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// Approve or reject a waiting booking (item owner only)
#[utoipa::path(
    patch,
    path = "/bookings/{booking_id}",
    tag = "bookings",
    params(
        ("booking_id" = i64, Path, description = "Booking ID"),
        DecideParams,
        ("X-Sharer-User-Id" = i64, Header, description = "Caller user id")
    ),
    responses(
        (status = 200, description = "Booking decided", body = BookingResponse),
        (status = 400, description = "Booking already decided", body = crate::error::ErrorResponse),
        (status = 403, description = "Caller is not the item owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Booking not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn decide_booking(
    State(state): State<crate::AppState>,
    CallerId(caller): CallerId,
    Path(booking_id): Path<i64>,
    Query(params): Query<DecideParams>,
) -> AppResult<Json<BookingResponse>> {
    let booking = state
        .services
        .bookings
        .decide_booking(booking_id, caller, params.approved)
        .await?;

    Ok(Json(booking.into()))
}

/// Get a booking (visible to the booker and the item owner)
#[utoipa::path(
    get,
    path = "/bookings/{booking_id}",
    tag = "bookings",
    params(
        ("booking_id" = i64, Path, description = "Booking ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Caller user id")
    ),
    responses(
        (status = 200, description = "Booking details", body = BookingResponse),
        (status = 403, description = "Caller is neither booker nor owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Booking not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_booking(
    State(state): State<crate::AppState>,
    CallerId(caller): CallerId,
    Path(booking_id): Path<i64>,
) -> AppResult<Json<BookingResponse>> {
    let booking = state.services.bookings.get_booking(booking_id, caller).await?;
    Ok(Json(booking.into()))
}

/// List bookings requested by the caller
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    params(
        StateParams,
        ("X-Sharer-User-Id" = i64, Header, description = "Caller user id")
    ),
    responses(
        (status = 200, description = "Caller's bookings, newest start first", body = Vec<BookingResponse>),
        (status = 400, description = "Unknown state selector", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_booker_bookings(
    State(state): State<crate::AppState>,
    CallerId(caller): CallerId,
    Query(params): Query<StateParams>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let selector = params.state.as_deref().unwrap_or("ALL");
    let bookings = state
        .services
        .bookings
        .get_booker_bookings(caller, selector)
        .await?;

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// List bookings on items the caller owns
#[utoipa::path(
    get,
    path = "/bookings/owner",
    tag = "bookings",
    params(
        StateParams,
        ("X-Sharer-User-Id" = i64, Header, description = "Caller user id")
    ),
    responses(
        (status = 200, description = "Bookings on the caller's items, newest start first", body = Vec<BookingResponse>),
        (status = 400, description = "Unknown state selector", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_owner_bookings(
    State(state): State<crate::AppState>,
    CallerId(caller): CallerId,
    Query(params): Query<StateParams>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let selector = params.state.as_deref().unwrap_or("ALL");
    let bookings = state
        .services
        .bookings
        .get_owner_bookings(caller, selector)
        .await?;

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}
