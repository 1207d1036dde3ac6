//! API and Database Models
//!
//! Data structures shared between the Postgres layer (`sqlx`) and the REST
//! surface (`utoipa` schemas).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(sqlx::Type, Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
#[sqlx(type_name = "session_status", rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Ended,
}

#[derive(sqlx::Type, Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
#[sqlx(type_name = "message_role", rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Ai,
}

// Display is used when roles end up in log fields.
impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Ai => write!(f, "ai"),
        }
    }
}

/// One tutoring session owned by a learner.
#[derive(Serialize, Deserialize, ToSchema, FromRow, Debug, Clone)]
pub struct Session {
    #[schema(value_type = String, format = Uuid)]
    pub id: Uuid,
    pub user_id: String,
    pub topic: String,
    #[schema(value_type = String, example = "active")]
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One conversation turn within a session.
#[derive(Serialize, Deserialize, ToSchema, FromRow, Debug, Clone)]
pub struct Message {
    pub id: i64,
    #[schema(value_type = String, format = Uuid)]
    pub session_id: Uuid,
    #[schema(value_type = String, example = "user")]
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateSessionPayload {
    #[schema(example = "Quantum Entanglement")]
    pub topic: String,
    /// The learner's opening request in their own words; used to pick the
    /// starting difficulty. Optional: without it the session starts at
    /// beginner difficulty.
    #[schema(example = "Can you explain quantum entanglement to a 10-year-old?")]
    pub request: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateSessionStatusPayload {
    #[schema(example = "ended")]
    pub status: SessionStatus,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_session_status_round_trip() {
        let active_json = serde_json::to_string(&SessionStatus::Active).unwrap();
        assert_eq!(active_json, "\"Active\"");

        let ended: SessionStatus = serde_json::from_str("\"Ended\"").unwrap();
        assert_eq!(ended, SessionStatus::Ended);
        assert_ne!(SessionStatus::Active, SessionStatus::Ended);
    }

    #[test]
    fn test_message_role_display() {
        assert_eq!(MessageRole::User.to_string(), "user");
        assert_eq!(MessageRole::Ai.to_string(), "ai");
    }

    #[test]
    fn test_session_serialization() {
        let session = Session {
            id: Uuid::nil(),
            user_id: "learner-1".to_string(),
            topic: "Gravity".to_string(),
            status: SessionStatus::Active,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        };
        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back.user_id, "learner-1");
        assert_eq!(back.topic, "Gravity");
    }

    #[test]
    fn test_create_session_payload_request_is_optional() {
        let p: CreateSessionPayload = serde_json::from_str(r#"{"topic": "Gravity"}"#).unwrap();
        assert_eq!(p.topic, "Gravity");
        assert!(p.request.is_none());

        let p: CreateSessionPayload =
            serde_json::from_str(r#"{"topic": "Gravity", "request": "keep it simple"}"#).unwrap();
        assert_eq!(p.request.as_deref(), Some("keep it simple"));
    }
}
