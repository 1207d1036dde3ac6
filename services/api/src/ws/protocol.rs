//! Defines the WebSocket message protocol between the client and the API server.

use crate::models;
use coach_core::session::SessionState;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from the client to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Resumes a session. This must be the first message.
    #[serde(rename = "init")]
    Init {
        /// The unique identifier of the session to resume.
        session_id: Option<Uuid>,
    },
    /// A text message from the learner to the coach.
    #[serde(rename = "user_message")]
    UserMessage { text: String },
}

/// Messages sent from the server to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms successful session initialization and provides the initial state.
    Initialized {
        session_id: Uuid,
        state: SessionState,
        history: Vec<models::Message>,
    },
    /// Pushes a complete, updated session state to the client.
    StateUpdate { state: SessionState },
    /// Reports a fatal error to the client.
    Error { message: String },
    /// Signals the beginning of a streamed text response from the coach.
    ResponseStart,
    /// A chunk of a streamed text response.
    ResponseChunk { chunk: String },
    /// Signals the end of a streamed text response.
    ResponseEnd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_message_parses() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "init", "session_id": null}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Init { session_id: None }));
    }

    #[test]
    fn user_message_parses() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type": "user_message", "text": "hi"}"#).unwrap();
        match msg {
            ClientMessage::UserMessage { text } => assert_eq!(text, "hi"),
            _ => panic!("expected user_message"),
        }
    }

    #[test]
    fn server_messages_tag_snake_case() {
        let json = serde_json::to_string(&ServerMessage::ResponseStart).unwrap();
        assert_eq!(json, r#"{"type":"response_start"}"#);

        let json = serde_json::to_string(&ServerMessage::ResponseChunk {
            chunk: "hello".into(),
        })
        .unwrap();
        assert!(json.contains(r#""type":"response_chunk""#));
    }
}
