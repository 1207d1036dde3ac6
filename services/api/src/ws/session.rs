//! Manages the primary WebSocket connection lifecycle for a coach session.

use super::{
    cycle::handle_react_cycle,
    protocol::{ClientMessage, ServerMessage},
};
use crate::{models, state::AppState};
use anyhow::{Context, Result, anyhow};
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use coach_core::{agent::CoachService, classifier::ResponseClassifier, session::SessionState};
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use rmcp::ServiceExt;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{Instrument, error, info, instrument, warn};
use uuid::Uuid;

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main handler for an individual WebSocket connection.
///
/// Performs the initial handshake that loads the persisted session, then
/// spawns the session loop.
#[instrument(name = "ws_session", skip_all, fields(session_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let temp_id: u32 = rand::random();
    tracing::Span::current().record("session_id", &temp_id.to_string());
    info!("New WebSocket connection. Awaiting initialization...");

    let (socket_tx, mut socket_rx) = socket.split();
    let socket_tx_arc = Arc::new(Mutex::new(socket_tx));

    // The first message from the client must be an `init` message.
    let init = if let Some(Ok(ws_msg)) = socket_rx.next().await {
        match ws_msg {
            Message::Text(text) => initialize_session_state(&text, &state).await,
            _ => Err(anyhow!("First message was not a text `init` message.")),
        }
    } else {
        info!("Client disconnected before sending init message.");
        return;
    };

    let (session_id, session_state, history) = match init {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Session initialization failed: {:?}", e);
            let mut sink = socket_tx_arc.lock().await;
            let _ = send_msg(
                &mut sink,
                ServerMessage::Error {
                    message: e.to_string(),
                },
            )
            .await;
            return;
        }
    };

    // Confirm success and hand the client its state and history.
    if send_msg(
        &mut *socket_tx_arc.lock().await,
        ServerMessage::Initialized {
            session_id,
            state: session_state.clone(),
            history: history.clone(),
        },
    )
    .await
    .is_err()
    {
        error!("Failed to send Initialized message to client.");
        return;
    }

    // Spawn the main session loop in a separate, instrumented task.
    let topic = session_state.topic.clone();
    let session_span = tracing::info_span!("coach_runtime", %session_id, %topic);
    tokio::spawn(
        async move {
            if let Err(e) = run_coach_session(
                state,
                socket_tx_arc,
                socket_rx,
                session_id,
                session_state,
                history,
            )
            .await
            {
                error!(error = ?e, "Coach session terminated with error.");
            }
            info!("Coach session finished.");
        }
        .instrument(session_span),
    );
}

/// Parses the `init` message and loads the session state from the database.
async fn initialize_session_state(
    init_text: &str,
    state: &Arc<AppState>,
) -> Result<(Uuid, SessionState, Vec<models::Message>)> {
    let init_msg: ClientMessage = serde_json::from_str(init_text)?;
    let session_id = if let ClientMessage::Init { session_id } = init_msg {
        session_id.context("`session_id` is required for `init`")?
    } else {
        return Err(anyhow!("First message must be `init`"));
    };

    tracing::Span::current().record("session_id", &session_id.to_string());
    info!("Resuming existing session");

    let session_state = state
        .db
        .get_latest_session_state(session_id)
        .await?
        .context("Session state not found")?;
    let history = state.db.get_session_messages(session_id).await?;
    Ok((session_id, session_state, history))
}

/// The main event loop for an active WebSocket session.
///
/// Listens for learner messages and for state updates coming out of the
/// coach's tool service, and keeps the database and the client in sync.
async fn run_coach_session(
    state: Arc<AppState>,
    socket_tx: Arc<Mutex<SplitSink<WebSocket, Message>>>,
    mut socket_rx: SplitStream<WebSocket>,
    session_id: Uuid,
    session_state: SessionState,
    mut history: Vec<models::Message>,
) -> Result<()> {
    let classifier = ResponseClassifier::new(state.topics.key_terms(&session_state.topic));
    let session_arc = Arc::new(tokio::sync::Mutex::new(session_state));
    let (state_update_tx, mut state_update_rx) = mpsc::channel(8);
    let coach_service = CoachService::new(session_arc.clone(), Some(state_update_tx), classifier);
    let (server_transport, client_transport) = tokio::io::duplex(4096);

    // Spawn the coach's tool-handling service.
    let coach_tool_handle = tokio::spawn(async move {
        if let Ok(service) = coach_service.serve(server_transport).await {
            let _ = service.waiting().await;
        }
    });
    let mcp_client = ().serve(client_transport).await?;

    loop {
        tokio::select! {
            // Handle messages from the client WebSocket.
            Some(msg_result) = socket_rx.next() => {
                match msg_result {
                    Ok(ws_msg) => match ws_msg {
                        Message::Text(text) => {
                            if let Ok(msg) = serde_json::from_str::<ClientMessage>(&text) {
                                match msg {
                                    ClientMessage::UserMessage { text } => {
                                        handle_react_cycle(&state, session_id, &mut history, &session_arc, &mcp_client, &text, &socket_tx).await?;
                                    }
                                    _ => warn!("Ignoring unexpected text message post-init."),
                                }
                            }
                        },
                        Message::Close(_) => {
                            info!("Client sent close frame. Shutting down session.");
                            break;
                        },
                        Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => {},
                    },
                    Err(e) => {
                        error!("Error receiving from client WebSocket: {:?}", e);
                        break;
                    }
                }
            },
            // Persist and forward state updates from the coach's tools.
            Some(new_state) = state_update_rx.recv() => {
                state.db.update_session_state(session_id, &new_state).await?;
                send_msg(&mut *socket_tx.lock().await, ServerMessage::StateUpdate { state: new_state }).await?;
            },
            // If all channels close, exit the loop.
            else => break,
        }
    }

    coach_tool_handle.abort();
    info!("WebSocket connection closed and coach session terminated.");
    Ok(())
}

/// A helper function to serialize and send a `ServerMessage` to the client.
pub(crate) async fn send_msg(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    msg: ServerMessage,
) -> Result<()> {
    let serialized = serde_json::to_string(&msg)?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}
