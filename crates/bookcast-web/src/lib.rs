//! Bookcast Web Server
//!
//! Axum-based server exposing the live booking feed over WebSocket, a REST
//! list endpoint and the dashboard page.

pub mod routes;
pub mod state;
pub mod websocket;

use axum::{routing::get, Router};
use bookcast_core::HubHandle;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
///
/// When `static_dir` is set, requests that match no route are served from it.
pub fn create_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/bookings", get(routes::bookings::list_bookings))
        .route("/bookings-data", get(routes::bookings::list_bookings))
        .with_state(state.clone());

    let router = Router::new()
        .route("/", get(routes::dashboard::index))
        .nest("/api", api_routes)
        .route("/ws", get(websocket::ws_handler));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and run the web server until `shutdown` is cancelled.
pub async fn run_server(
    hub: HubHandle,
    addr: &str,
    static_dir: Option<PathBuf>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, hub, static_dir, shutdown).await
}

/// Serve on an already bound listener.
///
/// Cancelling `shutdown` stops accepting connections and closes every open
/// WebSocket session, so their hub handles are released promptly.
pub async fn serve(
    listener: TcpListener,
    hub: HubHandle,
    static_dir: Option<PathBuf>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let state = AppState::new(hub, shutdown.clone());
    let app = create_router(state, static_dir);

    tracing::info!("Web server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}
