//! WebSocket upgrade handler.

use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;

use crate::state::AppState;

/// GET /ws: upgrade without credentials.
///
/// The client authenticates in-band with its first `auth` message, so
/// nothing is checked here.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let engine = state.realtime.clone();
    ws.on_upgrade(move |socket| async move { engine.accept(socket).await })
}
