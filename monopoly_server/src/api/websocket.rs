//! Live event streaming over WebSocket. Grounded on the split-socket,
//! select-loop pattern in `pp_server/src/api/websocket.rs`, simplified for a
//! single one-way event feed plus a handful of control commands (no auth,
//! no actor mailbox — everything here talks straight to `monopoly_core`).

use std::sync::Arc;

use axum::{
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use monopoly_core::api::GameStateSyncMessage;
use monopoly_core::event_bus::EventSubscriber;
use monopoly_core::registry::Session;
use monopoly_core::types::GameEvent;
use serde::Deserialize;
use tokio::sync::Notify;
use uuid::Uuid;

use super::AppState;

/// Wakes the forwarder task whenever the bus emits anything. The actual
/// event payload is read back out of `History`, not carried through here,
/// so the subscriber itself stays tiny and infallible.
struct NotifyingSubscriber(Arc<Notify>);

#[async_trait::async_trait]
impl EventSubscriber for NotifyingSubscriber {
    async fn on_event(&self, _event: &GameEvent) {
        self.0.notify_one();
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ControlMessage {
    Pause,
    Resume,
    SetSpeed { speed: f64 },
}

pub async fn stream_events(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.registry.get(session_id).await {
        Ok(session) => ws.on_upgrade(move |socket| handle_socket(socket, state, session_id, session)),
        Err(e) => (axum::http::StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

async fn handle_socket(socket: WebSocket, state: AppState, session_id: Uuid, session: Arc<Session>) {
    {
        let mut counts = state.stream_consumers.lock().await;
        *counts.entry(session_id).or_insert(0) += 1;
    }

    let notify = Arc::new(Notify::new());
    let subscription_id = session.event_bus.subscribe(None, Arc::new(NotifyingSubscriber(notify.clone()))).await;

    let (mut sender, mut receiver) = socket.split();

    let mut cursor = session.history.len() as u64;
    let stats = session.runner.stats().await;
    let state =
        monopoly_core::api::GetStateResponse::build(session_id, &session.runner, stats, session.created_at).await;
    let recent_events = session.history.since(cursor.saturating_sub(20));
    let sync = GameStateSyncMessage::new(state, recent_events);
    if let Ok(text) = serde_json::to_string(&sync) {
        if sender.send(Message::Text(text.into())).await.is_err() {
            cleanup(&state, &session, session_id, subscription_id).await;
            return;
        }
    }

    let forward_session = session.clone();
    let mut forward_task = tokio::spawn(async move {
        loop {
            let pending = forward_session.history.since(cursor);
            if pending.is_empty() {
                notify.notified().await;
                continue;
            }
            for event in &pending {
                cursor = cursor.max(event.sequence + 1);
                let Ok(text) = serde_json::to_string(event) else { continue };
                if sender.send(Message::Text(text.into())).await.is_err() {
                    return;
                }
            }
        }
    });

    let control_session = session.clone();
    let mut receive_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            let Message::Text(text) = message else { continue };
            let Ok(control) = serde_json::from_str::<ControlMessage>(&text) else { continue };
            match control {
                ControlMessage::Pause => control_session.runner.pause(),
                ControlMessage::Resume => control_session.runner.resume(),
                ControlMessage::SetSpeed { speed } => {
                    let _ = control_session.runner.set_speed(speed).await;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut forward_task => receive_task.abort(),
        _ = &mut receive_task => forward_task.abort(),
    }

    cleanup(&state, &session, session_id, subscription_id).await;
}

/// Unsubscribes this connection and, if it was the last one watching this
/// session, stops the runner and drops the session from the registry.
async fn cleanup(
    state: &AppState,
    session: &Arc<Session>,
    session_id: Uuid,
    subscription_id: monopoly_core::event_bus::SubscriptionId,
) {
    session.event_bus.unsubscribe(subscription_id).await;
    let remaining = {
        let mut counts = state.stream_consumers.lock().await;
        let count = counts.entry(session_id).or_insert(1);
        *count = count.saturating_sub(1);
        *count
    };
    if remaining == 0 {
        session.runner.stop();
        let _ = state.registry.remove(session_id).await;
        state.stream_consumers.lock().await.remove(&session_id);
    }
}
