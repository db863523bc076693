//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and runs one dashboard session per
//! connection.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::SessionHub;
use super::messages::{ClientMessage, ServerMessage};
use crate::api::AppState;
use crate::dashboard::{AppContext, DashboardSession, Update};

/// WebSocket upgrade handler
///
/// This is the entry point for dashboard sessions.
/// It upgrades the HTTP connection to WebSocket and starts the session loop.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let hub = Arc::clone(&state.hub);
    let context = Arc::clone(&state.context);
    ws.on_upgrade(move |socket| handle_socket(socket, hub, context))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, hub: Arc<SessionHub>, context: Arc<AppContext>) {
    let (mut sender, mut receiver) = socket.split();

    // Create channel for sending messages to this session
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Register with hub
    let session_id = match hub.register(tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register dashboard session");
            // Send error message before closing
            let error_msg = ServerMessage::error("TOO_MANY_SESSIONS", e.to_string());
            if let Some(text) = encode(&error_msg) {
                let _ = sender.send(Message::Text(text)).await;
            }
            return;
        }
    };

    // Task to forward messages from channel to WebSocket
    let conn_id_for_send = session_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Some(text) = encode(&msg) else {
                continue;
            };
            if sender.send(Message::Text(text)).await.is_err() {
                tracing::debug!(
                    session_id = %conn_id_for_send,
                    "WebSocket send failed, closing session"
                );
                break;
            }
        }
    });

    // Greet and mount the initial tab
    let session = DashboardSession::new(context);
    deliver(
        &hub,
        &session_id,
        ServerMessage::Connected {
            session_id: session_id.clone(),
        },
    )
    .await;
    deliver(&hub, &session_id, ServerMessage::Tab { view: session.render() }).await;

    // Task to receive messages and drive the session; each message is
    // handled to completion before the next frame is read
    let hub_for_recv = Arc::clone(&hub);
    let conn_id_for_recv = session_id.clone();
    let mut recv_task = tokio::spawn(async move {
        let mut session = session;
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&hub_for_recv, &conn_id_for_recv, &mut session, msg)
                        .await
                    {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        session_id = %conn_id_for_recv,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    // Cleanup: unregister from hub
    hub.unregister(&session_id).await;
}

/// Serialize a server message, logging failures
fn encode(message: &ServerMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            None
        }
    }
}

/// Queue a message for a session, logging when it cannot be delivered
async fn deliver(hub: &SessionHub, session_id: &str, message: ServerMessage) -> bool {
    match hub.send_to(session_id, message).await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(session_id = %session_id, error = %e, "Message not delivered");
            false
        }
    }
}

/// Handle a received WebSocket message
///
/// Returns false if the connection should be closed.
async fn handle_ws_message(
    hub: &SessionHub,
    session_id: &str,
    session: &mut DashboardSession,
    message: Message,
) -> bool {
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => {
                    let reply = handle_client_message(hub, session_id, session, client_msg).await;
                    deliver(hub, session_id, reply).await;
                }
                Err(e) => {
                    tracing::debug!(
                        session_id = %session_id,
                        error = %e,
                        text = %text,
                        "Invalid client message"
                    );
                    // Send error but keep connection open
                    let error_msg = ServerMessage::error(
                        "INVALID_MESSAGE",
                        format!("Invalid message format: {}", e),
                    );
                    deliver(hub, session_id, error_msg).await;
                }
            }
            true
        }
        Message::Binary(_) => {
            // We don't support binary messages
            let error_msg =
                ServerMessage::error("INVALID_MESSAGE", "Binary messages not supported");
            deliver(hub, session_id, error_msg).await;
            true
        }
        Message::Ping(_) | Message::Pong(_) => {
            // Axum answers pings automatically
            true
        }
        Message::Close(_) => {
            tracing::debug!(session_id = %session_id, "Client requested close");
            false
        }
    }
}

/// Apply a parsed client message to the session and build the reply
async fn handle_client_message(
    hub: &SessionHub,
    session_id: &str,
    session: &mut DashboardSession,
    message: ClientMessage,
) -> ServerMessage {
    let Some(event) = message.into_event() else {
        return ServerMessage::Pong;
    };

    match session.handle(event) {
        Ok(update) => {
            if let Update::Tab(view) = &update {
                if let Err(e) = hub.set_tab(session_id, view.tab()).await {
                    tracing::debug!(
                        session_id = %session_id,
                        error = %e,
                        "Tab change not recorded"
                    );
                }
            }
            update.into()
        }
        Err(e) => {
            tracing::warn!(
                session_id = %session_id,
                code = e.code(),
                error = %e,
                "Control event rejected"
            );
            ServerMessage::from(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::dashboard::Tab;
    use crate::data::parse_feed;
    use crate::websocket::{HubConfig, HubError};

    fn session() -> DashboardSession {
        let (table, report) = parse_feed(
            "dateChecked,state,positive,totalTestResults\n2020-03-20,MD,10,100\n2020-03-21,MD,20,200\n",
        )
        .unwrap();
        let context = AppContext::new(table, report, "test", &DashboardConfig::default());
        DashboardSession::new(Arc::new(context))
    }

    async fn registered_hub() -> (SessionHub, String, mpsc::UnboundedReceiver<ServerMessage>) {
        let hub = SessionHub::new(HubConfig::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let id = hub.register(tx).await.unwrap();
        (hub, id, rx)
    }

    #[tokio::test]
    async fn test_text_message_produces_chart() {
        let (hub, id, mut rx) = registered_hub().await;
        let mut session = session();

        let keep_open = handle_ws_message(
            &hub,
            &id,
            &mut session,
            Message::Text(r#"{"type": "set_scale", "scale": "log"}"#.to_string()),
        )
        .await;

        assert!(keep_open);
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::Chart { .. })));
    }

    #[tokio::test]
    async fn test_tab_switch_tracked_by_hub() {
        let (hub, id, mut rx) = registered_hub().await;
        let mut session = session();

        let message = Message::Text(r#"{"type": "select_tab", "tab": "us-state-map"}"#.to_string());
        handle_ws_message(&hub, &id, &mut session, message).await;

        assert!(matches!(rx.try_recv(), Ok(ServerMessage::Tab { .. })));
        assert_eq!(hub.tab_counts().await.us_state_map, 1);
        assert_eq!(session.tab(), Tab::UsStateMap);
    }

    #[tokio::test]
    async fn test_rejected_event_keeps_session_open() {
        let (hub, id, mut rx) = registered_hub().await;
        let mut session = session();

        let message = Message::Text(r#"{"type": "set_metric", "metric": "negative"}"#.to_string());
        assert!(handle_ws_message(&hub, &id, &mut session, message).await);

        match rx.try_recv() {
            Ok(ServerMessage::Error { code, .. }) => assert_eq!(code, "INVALID_METRIC"),
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_and_close_messages() {
        let (hub, id, mut rx) = registered_hub().await;
        let mut session = session();

        assert!(handle_ws_message(&hub, &id, &mut session, Message::Text("not json".into())).await);
        match rx.try_recv() {
            Ok(ServerMessage::Error { code, .. }) => assert_eq!(code, "INVALID_MESSAGE"),
            other => panic!("Expected Error, got {:?}", other),
        }

        assert!(!handle_ws_message(&hub, &id, &mut session, Message::Close(None)).await);
    }

    #[tokio::test]
    async fn test_unregistered_session_still_handled() {
        let (hub, id, _rx) = registered_hub().await;
        hub.unregister(&id).await;
        let mut session = session();

        let message = Message::Text(r#"{"type": "select_tab", "tab": "us-state-map"}"#.to_string());
        assert!(handle_ws_message(&hub, &id, &mut session, message).await);
        assert_eq!(session.tab(), Tab::UsStateMap);
        assert_eq!(hub.tab_counts().await.us_state_map, 0);

        assert!(!deliver(&hub, &id, ServerMessage::Pong).await);
    }

    #[tokio::test]
    async fn test_deliver_to_closed_channel() {
        let (hub, id, rx) = registered_hub().await;
        drop(rx);

        assert!(!deliver(&hub, &id, ServerMessage::Pong).await);
        assert!(matches!(
            hub.send_to(&id, ServerMessage::Pong).await,
            Err(HubError::SendFailed)
        ));
    }

    #[tokio::test]
    async fn test_ping_gets_pong() {
        let (hub, id, mut rx) = registered_hub().await;
        let mut session = session();

        handle_ws_message(&hub, &id, &mut session, Message::Text(r#"{"type":"ping"}"#.into())).await;
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::Pong)));
    }
}
