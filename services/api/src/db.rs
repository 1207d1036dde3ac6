//! Data Access Layer
//!
//! All interaction with PostgreSQL lives here. Queries are runtime-bound
//! (`sqlx::query_as` with explicit binds) so the workspace builds without a
//! live database; the schema is owned by the embedded migrations.

use anyhow::Result;
use coach_core::session::SessionState;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Message, MessageRole, Session, SessionStatus};

/// A wrapper around the `PgPool` to provide a clear data access interface.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Creates a new `Db` instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs all pending `sqlx` migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Creates a new session and its initial coach state in one transaction.
    pub async fn create_session(
        &self,
        user_id: &str,
        topic: &str,
        initial_state: &SessionState,
    ) -> Result<Session> {
        let mut tx = self.pool.begin().await?;

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, topic)
            VALUES ($1, $2)
            RETURNING id, user_id, topic, status, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(topic)
        .fetch_one(&mut *tx)
        .await?;

        let state_json = serde_json::to_value(initial_state)?;

        sqlx::query("INSERT INTO session_states (session_id, state_json) VALUES ($1, $2)")
            .bind(session.id)
            .bind(state_json)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(session)
    }

    /// Retrieves a single session by its ID, scoped to a specific user.
    pub async fn get_session(&self, session_id: Uuid, user_id: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, topic, status, created_at, updated_at
            FROM sessions
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    /// Lists all sessions for a given user, ordered by most recent.
    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<Session>> {
        let sessions = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, topic, status, created_at, updated_at
            FROM sessions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    /// Adds a new message to a session's conversation history.
    pub async fn add_message(
        &self,
        session_id: Uuid,
        role: MessageRole,
        content: &str,
    ) -> Result<Message> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (session_id, role, content)
            VALUES ($1, $2, $3)
            RETURNING id, session_id, role, content, created_at
            "#,
        )
        .bind(session_id)
        .bind(role)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(message)
    }

    /// Retrieves the full message history for a session, ordered chronologically.
    pub async fn get_session_messages(&self, session_id: Uuid) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, session_id, role, content, created_at
            FROM messages
            WHERE session_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    /// Retrieves the most recent coach state for a session.
    pub async fn get_latest_session_state(
        &self,
        session_id: Uuid,
    ) -> Result<Option<SessionState>> {
        let record = sqlx::query_scalar::<_, serde_json::Value>(
            r#"
            SELECT state_json FROM session_states
            WHERE session_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        match record {
            Some(value) => {
                let state: SessionState = serde_json::from_value(value)?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    /// Persists a new version of the coach's session state. Versions are
    /// append-only; the latest one wins.
    pub async fn update_session_state(
        &self,
        session_id: Uuid,
        state: &SessionState,
    ) -> Result<()> {
        let state_json = serde_json::to_value(state)?;
        sqlx::query("INSERT INTO session_states (session_id, state_json) VALUES ($1, $2)")
            .bind(session_id)
            .bind(state_json)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Updates the status of a session (e.g., from 'active' to 'ended').
    pub async fn update_session_status(
        &self,
        session_id: Uuid,
        status: SessionStatus,
    ) -> Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET status = $1, updated_at = now()
            WHERE id = $2
            RETURNING id, user_id, topic, status, created_at, updated_at
            "#,
        )
        .bind(status)
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(session)
    }
}
