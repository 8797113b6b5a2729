//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{Stream, StreamExt},
};
use serde::Deserialize;
use tokio::sync::{mpsc, watch};

use crate::{
    domain::{Caller, ParticipantId, Role},
    ui::state::AppState,
    usecase::CoordinatorError,
};

use super::command::handle_client_message;

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub participant_id: String,
    pub role: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Convert String -> Domain Model
    let participant_id = match ParticipantId::try_from(query.participant_id.clone()) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Invalid participant_id '{}': {}", query.participant_id, e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };
    let role = match query.role.parse::<Role>() {
        Ok(role) => role,
        Err(e) => {
            tracing::warn!("Invalid role for '{}': {}", participant_id, e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    // Create a channel for this participant to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    // register_client is called inside the UseCase
    match state
        .connect_participant_usecase
        .execute(participant_id.clone(), role, query.name, tx)
        .await
    {
        Ok(participant) => {
            let caller = Caller::new(participant.id, role);
            let failed_state = state.clone();
            let failed_id = participant_id.clone();
            Ok(ws
                .on_failed_upgrade(move |e| {
                    tracing::warn!("WebSocket upgrade for '{}' failed: {}", failed_id, e);
                    tokio::spawn(async move {
                        failed_state
                            .disconnect_participant_usecase
                            .execute(&failed_id)
                            .await;
                    });
                })
                .on_upgrade(move |socket| handle_socket(socket, state, caller, rx)))
        }
        Err(CoordinatorError::DuplicateConnection(_)) => {
            tracing::warn!(
                "Participant '{}' is already connected. Rejecting connection.",
                participant_id
            );
            Err(StatusCode::CONFLICT)
        }
        Err(e) => {
            tracing::warn!("Failed to connect '{}': {}", participant_id, e);
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// The loop ends when the channel is closed (the participant was unregistered)
/// or the socket can no longer be written to.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Reads frames from the participant until the socket closes or `stop` fires.
///
/// `stop` is only checked between frames. A message that was already read is
/// always handled to the end before the loop returns.
async fn receive_loop<S>(
    mut receiver: S,
    state: Arc<AppState>,
    caller: Caller,
    mut stop: watch::Receiver<bool>,
) where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let next = tokio::select! {
            biased;
            _ = stop.changed() => {
                tracing::debug!("Stopped reading from '{}'", caller.id);
                break;
            }
            next = receiver.next() => next,
        };

        let msg = match next {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::warn!("WebSocket error from '{}': {}", caller.id, e);
                break;
            }
            None => break,
        };

        match msg {
            Message::Text(text) => {
                tracing::debug!("Received from '{}': {}", caller.id, text.as_str());
                handle_client_message(&state, &caller, text.as_str()).await;
            }
            Message::Binary(_) => {
                state
                    .dispatcher
                    .reply_error(
                        &caller.id,
                        &CoordinatorError::Forbidden("binary frames are not supported".to_string()),
                    )
                    .await;
            }
            Message::Close(_) => {
                tracing::info!("Participant '{}' requested close", caller.id);
                break;
            }
            // Ping/pong is handled automatically by the WebSocket protocol
            _ => {}
        }
    }
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    caller: Caller,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (sender, receiver) = socket.split();
    let (stop_tx, stop_rx) = watch::channel(false);

    // Spawn a task to receive messages from this participant
    let mut recv_task = tokio::spawn(receive_loop(
        receiver,
        state.clone(),
        caller.clone(),
        stop_rx,
    ));

    // Spawn a task to push events to this participant
    let mut send_task = pusher_loop(rx, sender);

    // The pusher task only writes frames and can be aborted at any point.
    // The receive task is stopped between frames so the current action completes.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => {
            stop_tx.send_replace(true);
            if let Err(e) = recv_task.await {
                tracing::warn!("Receive task for '{}' failed: {}", caller.id, e);
            }
        }
    };

    // Use DisconnectParticipantUseCase to handle disconnection
    match state
        .disconnect_participant_usecase
        .execute(&caller.id)
        .await
    {
        Some(participant) => tracing::info!(
            "Participant '{}' ({}) disconnected",
            participant.id,
            participant.role
        ),
        None => tracing::debug!("Participant '{}' was already removed", caller.id),
    }
}
