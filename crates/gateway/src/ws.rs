//! `GET /ws` — the chat relay transport.
//!
//! Protocol:
//! - Upgrade → server sends `connected`
//! - `{"event":"user_message","data":{"message":"..."}}` → `agent_response`
//! - `{"event":"end_session"}` → `session_ended` (connection stays open)
//! - Close frame or dropped socket → session discarded, nothing sent
//!
//! Frames on one connection are handled strictly one after another.

use axum::extract::State;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use realtychat_core::message::ConnectionId;
use realtychat_relay::{ClientEvent, ConnectionSession, Relay, ServerEvent};
use tracing::{debug, info, warn};

use crate::SharedState;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

async fn handle_ws_connection(mut socket: WebSocket, state: SharedState) {
    let id = ConnectionId::new();
    let handle = state.sessions.open(id.clone()).await;
    info!(connection_id = %id, "WebSocket connection established");

    let connected = {
        let mut session = handle.lock().await;
        state.relay.on_connect(&mut session)
    };

    if send_event(&mut socket, &connected).await {
        while let Some(msg) = socket.recv().await {
            let text = match msg {
                Ok(WsMessage::Text(text)) => text,
                Ok(WsMessage::Close(_)) => break,
                Ok(_) => continue, // ignore binary, ping, pong
                Err(e) => {
                    debug!(connection_id = %id, error = %e, "WebSocket receive failed");
                    break;
                }
            };

            let reply = {
                let mut session = handle.lock().await;
                handle_frame(&state.relay, &mut session, text.as_str()).await
            };

            if let Some(event) = reply {
                if !send_event(&mut socket, &event).await {
                    break;
                }
            }
        }
    }

    {
        let mut session = handle.lock().await;
        state.relay.on_disconnect(&mut session);
    }
    state.sessions.close(&id).await;
    info!(connection_id = %id, "WebSocket connection closed");
}

/// Decode one text frame and run it through the relay.
///
/// Returns the event to send back, or `None` when the frame was unreadable.
pub async fn handle_frame(
    relay: &Relay,
    session: &mut ConnectionSession,
    frame: &str,
) -> Option<ServerEvent> {
    match serde_json::from_str::<ClientEvent>(frame) {
        Ok(ClientEvent::UserMessage { message }) => Some(relay.on_message(session, &message).await),
        Ok(ClientEvent::EndSession) => Some(relay.on_end(session)),
        Err(e) => {
            warn!(connection_id = %session.id(), error = %e, "Ignoring unreadable frame");
            None
        }
    }
}

/// Send `event` as a JSON text frame. Returns `false` once the client is gone.
async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> bool {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Failed to encode server event");
            return true;
        }
    };
    socket.send(WsMessage::Text(json.into())).await.is_ok()
}
