//! Dashboard route handler.
//!
//! Serves the embedded live bookings page.

use axum::response::{Html, IntoResponse};

const DASHBOARD_HTML: &str = include_str!("../../assets/index.html");

/// GET / - Serve the live bookings dashboard.
pub async fn index() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}
