//! Application state.

use bookcast_core::HubHandle;
use tokio_util::sync::CancellationToken;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub hub: HubHandle,
    /// Cancelled when the server stops; open WebSocket sessions close on it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(hub: HubHandle, shutdown: CancellationToken) -> Self {
        Self { hub, shutdown }
    }
}
