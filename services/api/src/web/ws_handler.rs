//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! It feeds client messages to the session, sends the replies, starts the
//! progress writes and forwards detail-screen events to the client.

use crate::web::{
    protocol::{ClientMessage, ServerMessage},
    session::Reply,
    state::{AppState, SessionState},
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use chrono::Utc;
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use visa_guide_core::events::JourneyEvent;

type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();
    info!(%connection_id, "New wizard connection established");

    // The sender is shared with the event forwarder task.
    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));
    let connection_token = CancellationToken::new();
    let scroll_delay = app_state.config.scroll_delay;

    let mut session = SessionState::new(app_state);

    // --- 1. Initial Screen ---
    if !send_message(&ws_sender, &session.screen_message()).await {
        error!("Failed to send the initial screen.");
        return;
    }

    // --- 2. Main Message Loop ---
    loop {
        let Some(Ok(msg)) = receiver.next().await else {
            info!(%connection_id, "Client disconnected.");
            break;
        };
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                Ok(client_msg) => {
                    let reply = session.handle(client_msg, Utc::now()).await;
                    apply_reply(reply, &session, &ws_sender, &connection_token, scroll_delay).await;
                }
                Err(e) => {
                    warn!("Failed to deserialize client message: {}", e);
                    let err = ServerMessage::Error {
                        message: format!("Unrecognized message: {}", e),
                    };
                    send_message(&ws_sender, &err).await;
                }
            },
            Message::Close(_) => {
                info!(%connection_id, "Client sent close message.");
                break;
            }
            _ => {}
        }
    }

    // --- 3. Cleanup ---
    connection_token.cancel();
    info!(%connection_id, "WebSocket connection closed.");
}

/// Sends the replies in order, then issues the progress writes without
/// waiting for them.
async fn apply_reply(
    reply: Reply,
    session: &SessionState,
    ws_sender: &WsSender,
    connection_token: &CancellationToken,
    scroll_delay: Duration,
) {
    if let Some(events) = reply.opened_journey {
        tokio::spawn(forward_journey_events(
            events,
            ws_sender.clone(),
            connection_token.child_token(),
            scroll_delay,
        ));
    }

    for message in &reply.messages {
        if !send_message(ws_sender, message).await {
            error!("Failed to send reply to client.");
            break;
        }
    }

    for record in reply.to_persist {
        let progress = session.app_state.progress.clone();
        tokio::spawn(async move {
            // Failures are logged by the gateway.
            if let Ok(outcome) = progress.save(&record).await {
                debug!(email = %record.email, source = ?outcome.source, "Progress persisted");
            }
        });
    }
}

/// Relays detail-screen events until the screen is closed or the
/// connection ends.
async fn forward_journey_events(
    mut events: broadcast::Receiver<JourneyEvent>,
    ws_sender: WsSender,
    token: CancellationToken,
    scroll_delay: Duration,
) {
    loop {
        let event = tokio::select! {
            _ = token.cancelled() => break,
            event = events.recv() => event,
        };
        match event {
            Ok(JourneyEvent::ChecklistSync(sync)) => {
                let msg = ServerMessage::ChecklistUpdated {
                    index: sync.index,
                    checked: sync.checked,
                };
                send_message(&ws_sender, &msg).await;
            }
            Ok(JourneyEvent::SwitchTab { tab, anchor }) => {
                let msg = ServerMessage::TabSwitched {
                    tab,
                    anchor: anchor.clone(),
                };
                send_message(&ws_sender, &msg).await;
                if let Some(anchor) = anchor {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = tokio::time::sleep(scroll_delay) => {}
                    }
                    send_message(&ws_sender, &ServerMessage::ScrollToAnchor { anchor }).await;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event forwarder lagged behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    debug!("Journey event forwarder stopped");
}

async fn send_message(ws_sender: &WsSender, msg: &ServerMessage) -> bool {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize server message: {}", e);
            return false;
        }
    };
    ws_sender
        .lock()
        .await
        .send(Message::Text(json.into()))
        .await
        .is_ok()
}
