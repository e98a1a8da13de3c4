use crate::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use domain::connection::{ConnectionId, RoutingEndpoint};
use domain::relay::{InboundEvent, Relay};
use domain::route::Route;
use futures::{SinkExt, StreamExt};
use log::*;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;

/// GET `/ws`: upgrade to a WebSocket and relay its frames.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    // Rows for local sockets name this instance, so other instances sharing
    // the registry can tell they do not hold the session.
    let endpoint = app_state.sockets.endpoint().clone();
    let (connection_id, outbound) = app_state.sockets.register_session();
    let relay = app_state.relay.clone();

    let connected = relay
        .dispatch(InboundEvent {
            connection_id: connection_id.clone(),
            endpoint: endpoint.clone(),
            route: Route::Connect,
            body: None,
        })
        .await;

    if !connected.is_success() {
        warn!("Closing socket {connection_id}: {}", connected.message);
        app_state.sockets.unregister_session(&connection_id);
        let mut socket = socket;
        let _ = socket.send(Message::Close(None)).await;
        return;
    }

    run_session(socket, connection_id.clone(), endpoint.clone(), outbound, relay.clone()).await;

    // Deregister before dropping the session so a concurrent broadcast sees
    // either a live session or no registry row.
    relay
        .dispatch(InboundEvent {
            connection_id: connection_id.clone(),
            endpoint,
            route: Route::Disconnect,
            body: None,
        })
        .await;
    app_state.sockets.unregister_session(&connection_id);
}

/// Pumps queued frames out and received frames into the relay until either
/// side closes.
async fn run_session(
    socket: WebSocket,
    connection_id: ConnectionId,
    endpoint: RoutingEndpoint,
    mut outbound: Receiver<String>,
    relay: Arc<Relay>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let writer_id = connection_id.clone();
    let mut writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if let Err(e) = ws_tx.send(Message::Text(frame.into())).await {
                debug!("Write to socket {writer_id} failed: {e}");
                break;
            }
        }
    });

    let mut reader = tokio::spawn(async move {
        while let Some(Ok(message)) = ws_rx.next().await {
            let body = match message {
                Message::Text(text) => text.as_str().to_owned(),
                Message::Close(_) => break,
                // Pings are answered by axum; binary frames carry no route.
                _ => continue,
            };

            let route = relay.selector().select(&body);
            let response = relay
                .dispatch(InboundEvent {
                    connection_id: connection_id.clone(),
                    endpoint: endpoint.clone(),
                    route,
                    body: Some(body),
                })
                .await;

            if !response.is_success() {
                debug!(
                    "Frame from {connection_id} answered {}: {}",
                    response.status_code(),
                    response.message
                );
            }
        }
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }
}
