//! API handlers for Lendique REST endpoints

pub mod bookings;
pub mod health;
pub mod openapi;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, AppState};

/// Header carrying the caller's user id, set by the edge gateway after
/// authentication.
pub const SHARER_USER_ID: &str = "X-Sharer-User-Id";

/// Extractor for the caller id from the gateway header
pub struct CallerId(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for CallerId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SHARER_USER_ID)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::Validation(format!("Missing {} header", SHARER_USER_ID))
            })?;

        let id = raw.trim().parse::<i64>().map_err(|_| {
            AppError::Validation(format!("Invalid {} header: {}", SHARER_USER_ID, raw))
        })?;

        Ok(CallerId(id))
    }
}
