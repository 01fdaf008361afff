// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live update WebSocket.
//!
//! Authenticated like any other API route (cookie or bearer token on the
//! upgrade request). Server-to-client only: events from the [`LiveHub`] are
//! sent as JSON text frames; client text is ignored.
//!
//! [`LiveHub`]: crate::services::LiveHub

use crate::middleware::auth::AuthUser;
use crate::services::LiveEvent;
use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

/// Ping interval that keeps idle connections open through proxies.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/live", get(live_upgrade))
}

async fn live_upgrade(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| relay_events(socket, state, auth.user_id))
}

async fn relay_events(socket: WebSocket, state: Arc<AppState>, user_id: String) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.live.subscribe(&user_id);
    tracing::info!(user_id = %user_id, "Live connection opened");

    let send_user = user_id.clone();
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;

        loop {
            tokio::select! {
                result = events.recv() => {
                    let event: LiveEvent = match result {
                        Ok(event) => event,
                        Err(RecvError::Lagged(n)) => {
                            tracing::warn!(
                                user_id = %send_user,
                                skipped = n,
                                "Live receiver lagged"
                            );
                            continue;
                        }
                        Err(RecvError::Closed) => break,
                    };
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to encode live event");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if sender.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => {
            send_task.abort();
            // Wait for the receiver to drop before releasing the channel.
            let _ = (&mut send_task).await;
        }
    }

    state.live.release(&user_id);
    tracing::info!(user_id = %user_id, "Live connection closed");
}
