//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{bookings, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lendique API",
        version = "1.0.0",
        description = "Peer-to-peer item lending marketplace REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Bookings
        bookings::create_booking,
        bookings::decide_booking,
        bookings::get_booking,
        bookings::get_booker_bookings,
        bookings::get_owner_bookings,
    ),
    components(
        schemas(
            // Bookings
            bookings::CreateBookingRequest,
            bookings::BookingResponse,
            crate::models::booking::BookingDetails,
            crate::models::booking::BookingStatus,
            crate::models::item::ItemRef,
            crate::models::user::UserRef,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "bookings", description = "Booking lifecycle and queries")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
