//! Live inventory delta stream.
//!
//! Each connected socket joins the shared hub. On accept the client receives
//! one snapshot delta per flower carrying the current reserved total; after
//! that every delta another session publishes is relayed as it happens. Text
//! frames sent by the client are parsed as deltas and folded into the hub;
//! frames that do not parse are logged and skipped, never fatal.

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt, stream::SplitSink};
use tokio::sync::broadcast;
use tracing::instrument;

use petal_market_cart::InventoryDelta;

use crate::hub::{ClientId, InventoryHub};
use crate::state::AppState;

/// `GET /ws/inventory` — upgrade and attach to the hub.
#[instrument(skip(state, ws))]
pub async fn inventory(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let hub = state.hub().clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: InventoryHub) {
    let (client, snapshot, mut rx) = hub.join().await;
    let (mut sink, mut stream) = socket.split();

    for delta in snapshot {
        if send_delta(&mut sink, &delta).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            incoming = stream.next() => {
                if !handle_incoming(incoming, &hub, client).await {
                    break;
                }
            }
            relayed = rx.recv() => match relayed {
                // Never echo a session's own deltas back at it.
                Ok(message) if message.sender == client => {}
                Ok(message) => {
                    if send_delta(&mut sink, &message.delta).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "inventory stream lagged, client totals may drift");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

/// Process one frame from the client. Returns `false` when the socket is done.
async fn handle_incoming(
    incoming: Option<Result<Message, axum::Error>>,
    hub: &InventoryHub,
    client: ClientId,
) -> bool {
    match incoming {
        Some(Ok(Message::Text(text))) => {
            match serde_json::from_str::<InventoryDelta>(text.as_str()) {
                Ok(delta) => hub.publish(client, delta).await,
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring unparseable inventory frame");
                }
            }
            true
        }
        // Ping/pong and binary frames are ignored.
        Some(Ok(Message::Close(_))) | None => false,
        Some(Ok(_)) => true,
        Some(Err(e)) => {
            tracing::debug!(error = %e, "websocket receive error");
            false
        }
    }
}

async fn send_delta(
    sink: &mut SplitSink<WebSocket, Message>,
    delta: &InventoryDelta,
) -> Result<(), axum::Error> {
    let Ok(payload) = serde_json::to_string(delta) else {
        return Ok(());
    };
    sink.send(Message::Text(payload.into())).await
}

#[cfg(test)]
mod tests {
    use petal_market_core::FlowerId;

    use super::*;

    fn hub_and_client() -> (InventoryHub, ClientId) {
        let hub = InventoryHub::new();
        let client = hub.client_id();
        (hub, client)
    }

    #[tokio::test]
    async fn test_text_frame_publishes_delta() {
        let (hub, client) = hub_and_client();
        let frame = Some(Ok(Message::Text(r#"{"flower_id":1,"number":2}"#.into())));

        assert!(handle_incoming(frame, &hub, client).await);
        assert_eq!(hub.total(FlowerId::new(1)).await, 2);
    }

    #[tokio::test]
    async fn test_unparseable_frame_is_ignored() {
        let (hub, client) = hub_and_client();
        let frame = Some(Ok(Message::Text("not json".into())));

        // The socket stays up and nothing is folded into the totals.
        assert!(handle_incoming(frame, &hub, client).await);
        assert_eq!(hub.total(FlowerId::new(1)).await, 0);
    }

    #[tokio::test]
    async fn test_binary_frame_is_skipped() {
        let (hub, client) = hub_and_client();
        let frame = Some(Ok(Message::Binary(vec![1, 2, 3].into())));

        assert!(handle_incoming(frame, &hub, client).await);
        assert_eq!(hub.total(FlowerId::new(1)).await, 0);
    }

    #[tokio::test]
    async fn test_close_frame_and_eof_end_the_socket() {
        let (hub, client) = hub_and_client();

        assert!(!handle_incoming(Some(Ok(Message::Close(None))), &hub, client).await);
        assert!(!handle_incoming(None, &hub, client).await);
    }
}
