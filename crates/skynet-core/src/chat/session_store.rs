//! Process-lifetime transcript store keyed by client session tokens.
//!
//! Backed by `DashMap`. Every operation runs under a single shard guard and
//! clones what it returns, so no guard is ever held across `.await` and a
//! single append is never observed half-applied. Two concurrent requests on
//! the same token may still interleave their read/append pairs.
//!
//! Entries are never evicted: the map grows with every new token until the
//! process exits.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;

use skynet_types::chat::{Conversation, ConversationSummary, NewTurn, SessionId, Turn};
use skynet_types::error::RepositoryError;

use super::repository::TranscriptStore;

struct SessionEntry {
    conversation: Conversation<SessionId>,
    turns: Vec<Turn<SessionId>>,
    /// Monotonic activity stamp; breaks `updated_at` ties in listings.
    activity: u64,
}

/// In-memory [`TranscriptStore`]. Nothing survives a restart.
///
/// Cloning produces a shared view of the same sessions.
#[derive(Clone, Default)]
pub struct InMemoryTranscriptStore {
    sessions: Arc<DashMap<SessionId, SessionEntry>>,
    activity: Arc<AtomicU64>,
}

impl InMemoryTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn next_activity(&self) -> u64 {
        self.activity.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn new_entry(&self, id: SessionId, title: &str) -> SessionEntry {
        let now = Utc::now();
        SessionEntry {
            conversation: Conversation {
                id,
                title: title.to_string(),
                created_at: now,
                updated_at: now,
            },
            turns: Vec::new(),
            activity: self.next_activity(),
        }
    }
}

impl TranscriptStore for InMemoryTranscriptStore {
    type Id = SessionId;

    async fn create_conversation(
        &self,
        title: &str,
    ) -> Result<Conversation<SessionId>, RepositoryError> {
        let id = SessionId::generate();
        let entry = self.new_entry(id.clone(), title);
        let conversation = entry.conversation.clone();
        self.sessions.insert(id, entry);
        Ok(conversation)
    }

    async fn open_conversation(
        &self,
        id: &SessionId,
    ) -> Result<Conversation<SessionId>, RepositoryError> {
        let entry = self
            .sessions
            .entry(id.clone())
            .or_insert_with(|| self.new_entry(id.clone(), id.as_str()));
        Ok(entry.conversation.clone())
    }

    async fn get_conversation(
        &self,
        id: &SessionId,
    ) -> Result<Option<Conversation<SessionId>>, RepositoryError> {
        Ok(self.sessions.get(id).map(|e| e.conversation.clone()))
    }

    async fn rename_conversation(
        &self,
        id: &SessionId,
        title: &str,
    ) -> Result<Conversation<SessionId>, RepositoryError> {
        let activity = self.next_activity();
        let mut entry = self.sessions.get_mut(id).ok_or(RepositoryError::NotFound)?;
        entry.conversation.title = title.to_string();
        entry.conversation.updated_at = Utc::now();
        entry.activity = activity;
        Ok(entry.conversation.clone())
    }

    async fn append_turn(
        &self,
        turn: NewTurn<SessionId>,
    ) -> Result<Turn<SessionId>, RepositoryError> {
        let activity = self.next_activity();
        let mut entry = self
            .sessions
            .get_mut(&turn.conversation_id)
            .ok_or(RepositoryError::NotFound)?;

        let now = Utc::now();
        let turn = turn.into_turn(now);
        entry.turns.push(turn.clone());
        entry.conversation.updated_at = now;
        entry.activity = activity;
        Ok(turn)
    }

    async fn read_turns(&self, id: &SessionId) -> Result<Vec<Turn<SessionId>>, RepositoryError> {
        self.sessions
            .get(id)
            .map(|e| e.turns.clone())
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_conversations(
        &self,
    ) -> Result<Vec<ConversationSummary<SessionId>>, RepositoryError> {
        let mut rows: Vec<(u64, ConversationSummary<SessionId>)> = self
            .sessions
            .iter()
            .map(|e| {
                (
                    e.activity,
                    ConversationSummary {
                        conversation: e.conversation.clone(),
                        message_count: e.turns.len() as u32,
                    },
                )
            })
            .collect();

        rows.sort_by(|(a_act, a), (b_act, b)| {
            b.conversation
                .updated_at
                .cmp(&a.conversation.updated_at)
                .then(b_act.cmp(a_act))
        });

        Ok(rows.into_iter().map(|(_, s)| s).collect())
    }

    async fn clear_turns(&self, id: &SessionId) -> Result<(), RepositoryError> {
        if let Some(mut entry) = self.sessions.get_mut(id) {
            entry.turns.clear();
        }
        Ok(())
    }

    async fn delete_conversation(&self, id: &SessionId) -> Result<(), RepositoryError> {
        self.sessions.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skynet_types::chat::TurnRole;
    use skynet_types::persona::Persona;

    fn sid(s: &str) -> SessionId {
        SessionId::new(s).unwrap()
    }

    fn neo() -> Persona {
        Persona {
            key: "hacker".to_string(),
            display_name: "Neo".to_string(),
            system_instruction: "You are Neo.".to_string(),
            accent_color: "#00ff41".to_string(),
        }
    }

    #[tokio::test]
    async fn test_open_creates_empty_session() {
        let store = InMemoryTranscriptStore::new();
        let id = sid("tok-1");

        assert!(store.get_conversation(&id).await.unwrap().is_none());
        let conv = store.open_conversation(&id).await.unwrap();
        assert_eq!(conv.id, id);
        assert_eq!(conv.created_at, conv.updated_at);
        assert!(store.read_turns(&id).await.unwrap().is_empty());

        // Opening again is a lookup, not a reset.
        store.append_turn(NewTurn::user(id.clone(), "hi")).await.unwrap();
        store.open_conversation(&id).await.unwrap();
        assert_eq!(store.read_turns(&id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_append_preserves_insertion_order() {
        let store = InMemoryTranscriptStore::new();
        let id = store.create_conversation("ordered").await.unwrap().id;

        for i in 0..25 {
            store
                .append_turn(NewTurn::user(id.clone(), format!("msg {i}")))
                .await
                .unwrap();
        }

        let turns = store.read_turns(&id).await.unwrap();
        assert_eq!(turns.len(), 25);
        for (i, turn) in turns.iter().enumerate() {
            assert_eq!(turn.content, format!("msg {i}"));
        }
    }

    #[tokio::test]
    async fn test_ping_pong_roundtrip() {
        let store = InMemoryTranscriptStore::new();
        let id = store.create_conversation("c").await.unwrap().id;

        store.append_turn(NewTurn::user(id.clone(), "ping")).await.unwrap();
        store
            .append_turn(NewTurn::assistant(id.clone(), "pong", &neo()))
            .await
            .unwrap();

        let turns = store.read_turns(&id).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, TurnRole::User);
        assert_eq!(turns[0].content, "ping");
        assert_eq!(turns[0].persona_name, None);
        assert_eq!(turns[1].role, TurnRole::Assistant);
        assert_eq!(turns[1].content, "pong");
        assert_eq!(turns[1].persona_name.as_deref(), Some("Neo"));
        assert_eq!(turns[1].accent_color.as_deref(), Some("#00ff41"));
    }

    #[tokio::test]
    async fn test_append_to_unknown_session_fails() {
        let store = InMemoryTranscriptStore::new();
        let err = store
            .append_turn(NewTurn::user(sid("ghost"), "boo"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_append_refreshes_updated_at() {
        let store = InMemoryTranscriptStore::new();
        let conv = store.create_conversation("c").await.unwrap();
        let turn = store
            .append_turn(NewTurn::user(conv.id.clone(), "x"))
            .await
            .unwrap();

        let after = store.get_conversation(&conv.id).await.unwrap().unwrap();
        assert_eq!(after.updated_at, turn.created_at);
        assert!(after.updated_at >= conv.updated_at);
        assert_eq!(after.created_at, conv.created_at);
    }

    #[tokio::test]
    async fn test_clear_keeps_session() {
        let store = InMemoryTranscriptStore::new();
        let id = sid("tok-clear");
        store.open_conversation(&id).await.unwrap();
        store.append_turn(NewTurn::user(id.clone(), "a")).await.unwrap();

        store.clear_turns(&id).await.unwrap();
        assert!(store.read_turns(&id).await.unwrap().is_empty());
        assert!(store.get_conversation(&id).await.unwrap().is_some());

        // Clearing an unknown session is not an error and creates nothing.
        store.clear_turns(&sid("nobody")).await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemoryTranscriptStore::new();
        let id = store.create_conversation("doomed").await.unwrap().id;
        store.append_turn(NewTurn::user(id.clone(), "a")).await.unwrap();

        store.delete_conversation(&id).await.unwrap();
        assert!(store.get_conversation(&id).await.unwrap().is_none());
        assert!(matches!(
            store.read_turns(&id).await.unwrap_err(),
            RepositoryError::NotFound
        ));

        store.delete_conversation(&id).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_orders_by_recent_activity() {
        let store = InMemoryTranscriptStore::new();
        let a = store.create_conversation("A").await.unwrap().id;
        let b = store.create_conversation("B").await.unwrap().id;
        store.append_turn(NewTurn::user(a.clone(), "again")).await.unwrap();

        let listed = store.list_conversations().await.unwrap();
        let ids: Vec<_> = listed.iter().map(|s| s.conversation.id.clone()).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(listed[0].message_count, 1);
        assert_eq!(listed[1].message_count, 0);
    }

    #[tokio::test]
    async fn test_rename() {
        let store = InMemoryTranscriptStore::new();
        let id = store.create_conversation("old").await.unwrap().id;
        let renamed = store.rename_conversation(&id, "new").await.unwrap();
        assert_eq!(renamed.title, "new");

        let err = store
            .rename_conversation(&sid("missing"), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_not_lost() {
        let store = InMemoryTranscriptStore::new();
        let id = store.create_conversation("busy").await.unwrap().id;

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append_turn(NewTurn::user(id, format!("{i}")))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(store.read_turns(&id).await.unwrap().len(), 16);
    }
}
