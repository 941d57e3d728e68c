//! SQLite transcript store.
//!
//! Implements `TranscriptStore` from `skynet-core` over the `chats` and
//! `messages` tables. Reads go to the reader pool, writes to the single
//! writer connection. An append inserts the message and refreshes the parent
//! chat inside one transaction, so a crash never leaves one without the other.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::Row;

use skynet_core::chat::repository::TranscriptStore;
use skynet_types::chat::{ChatId, Conversation, ConversationSummary, NewTurn, Turn, TurnRole};
use skynet_types::error::RepositoryError;

use super::pool::DatabasePool;

/// Bumps the chat's activity counter past every other chat.
const NEXT_ACTIVITY: &str = "(SELECT COALESCE(MAX(activity_seq), 0) + 1 FROM chats)";

/// SQLite-backed implementation of `TranscriptStore`, keyed by [`ChatId`].
#[derive(Clone)]
pub struct SqliteTranscriptStore {
    pool: DatabasePool,
}

impl SqliteTranscriptStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

struct ChatRow {
    id: i64,
    title: String,
    created_at: String,
    updated_at: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_conversation(self) -> Result<Conversation<ChatId>, RepositoryError> {
        Ok(Conversation {
            id: ChatId(self.id),
            title: self.title,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

struct MessageRow {
    chat_id: i64,
    role: String,
    content: String,
    personality: Option<String>,
    color: Option<String>,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            chat_id: row.try_get("chat_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            personality: row.try_get("personality")?,
            color: row.try_get("color")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_turn(self) -> Result<Turn<ChatId>, RepositoryError> {
        let role: TurnRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(Turn {
            conversation_id: ChatId(self.chat_id),
            role,
            content: self.content,
            persona_name: self.personality,
            accent_color: self.color,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime '{s}': {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time at the precision the database keeps.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Pool and I/O failures mean the store is unreachable; the rest are defects.
fn db_err(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => RepositoryError::Connection(e.to_string()),
        other => RepositoryError::Query(other.to_string()),
    }
}

impl TranscriptStore for SqliteTranscriptStore {
    type Id = ChatId;

    async fn create_conversation(
        &self,
        title: &str,
    ) -> Result<Conversation<ChatId>, RepositoryError> {
        let now = now();
        let stamp = format_datetime(&now);

        let result = sqlx::query(&format!(
            "INSERT INTO chats (title, created_at, updated_at, activity_seq) VALUES (?, ?, ?, {NEXT_ACTIVITY})"
        ))
        .bind(title)
        .bind(&stamp)
        .bind(&stamp)
        .execute(&self.pool.writer)
        .await
        .map_err(db_err)?;

        Ok(Conversation {
            id: ChatId(result.last_insert_rowid()),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn open_conversation(
        &self,
        id: &ChatId,
    ) -> Result<Conversation<ChatId>, RepositoryError> {
        self.get_conversation(id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_conversation(
        &self,
        id: &ChatId,
    ) -> Result<Option<Conversation<ChatId>>, RepositoryError> {
        let row = sqlx::query("SELECT id, title, created_at, updated_at FROM chats WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(db_err)?;

        match row {
            Some(row) => {
                let chat_row = ChatRow::from_row(&row).map_err(db_err)?;
                Ok(Some(chat_row.into_conversation()?))
            }
            None => Ok(None),
        }
    }

    async fn rename_conversation(
        &self,
        id: &ChatId,
        title: &str,
    ) -> Result<Conversation<ChatId>, RepositoryError> {
        let stamp = format_datetime(&now());

        let result = sqlx::query(&format!(
            "UPDATE chats SET title = ?, updated_at = ?, activity_seq = {NEXT_ACTIVITY} WHERE id = ?"
        ))
        .bind(title)
        .bind(&stamp)
        .bind(id.0)
        .execute(&self.pool.writer)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let row = sqlx::query("SELECT id, title, created_at, updated_at FROM chats WHERE id = ?")
            .bind(id.0)
            .fetch_one(&self.pool.writer)
            .await
            .map_err(db_err)?;
        ChatRow::from_row(&row).map_err(db_err)?.into_conversation()
    }

    async fn append_turn(&self, turn: NewTurn<ChatId>) -> Result<Turn<ChatId>, RepositoryError> {
        let now = now();
        let stamp = format_datetime(&now);

        let mut tx = self.pool.writer.begin().await.map_err(db_err)?;

        let touched = sqlx::query(&format!(
            "UPDATE chats SET updated_at = ?, activity_seq = {NEXT_ACTIVITY} WHERE id = ?"
        ))
        .bind(&stamp)
        .bind(turn.conversation_id.0)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        // Dropping the transaction rolls it back.
        if touched.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            r#"INSERT INTO messages (chat_id, role, content, personality, color, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(turn.conversation_id.0)
        .bind(turn.role.to_string())
        .bind(&turn.content)
        .bind(&turn.persona_name)
        .bind(&turn.accent_color)
        .bind(&stamp)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        Ok(turn.into_turn(now))
    }

    async fn read_turns(&self, id: &ChatId) -> Result<Vec<Turn<ChatId>>, RepositoryError> {
        if self.get_conversation(id).await?.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let rows = sqlx::query(
            r#"SELECT chat_id, role, content, personality, color, created_at
               FROM messages WHERE chat_id = ?
               ORDER BY created_at ASC, id ASC"#,
        )
        .bind(id.0)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(db_err)?;

        rows.iter()
            .map(|row| {
                MessageRow::from_row(row)
                    .map_err(db_err)?
                    .into_turn()
            })
            .collect()
    }

    async fn list_conversations(
        &self,
    ) -> Result<Vec<ConversationSummary<ChatId>>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT c.id, c.title, c.created_at, c.updated_at, COUNT(m.id) AS message_count
               FROM chats c
               LEFT JOIN messages m ON m.chat_id = c.id
               GROUP BY c.id
               ORDER BY c.updated_at DESC, c.activity_seq DESC"#,
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(db_err)?;

        rows.iter()
            .map(|row| {
                let message_count: i64 = row.try_get("message_count").map_err(db_err)?;
                let conversation = ChatRow::from_row(row).map_err(db_err)?.into_conversation()?;
                Ok(ConversationSummary {
                    conversation,
                    message_count: message_count as u32,
                })
            })
            .collect()
    }

    async fn clear_turns(&self, id: &ChatId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM messages WHERE chat_id = ?")
            .bind(id.0)
            .execute(&self.pool.writer)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_conversation(&self, id: &ChatId) -> Result<(), RepositoryError> {
        // Messages go with the chat via ON DELETE CASCADE.
        sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool.writer)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
