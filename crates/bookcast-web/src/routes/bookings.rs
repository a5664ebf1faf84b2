//! Booking route handlers.

use axum::{extract::State, http::StatusCode, Json};
use bookcast_core::Booking;
use tracing::debug;

use crate::state::AppState;

/// GET /api/bookings - Current list, newest first.
pub async fn list_bookings(
    State(state): State<AppState>,
) -> Result<Json<Vec<Booking>>, (StatusCode, String)> {
    let bookings = state
        .hub
        .list()
        .await
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;

    debug!(count = bookings.len(), "Serving booking list");
    Ok(Json(bookings))
}
