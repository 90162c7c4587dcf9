//! Conversation and message storage.
//!
//! A conversation owns an ordered sequence of messages. Messages live in
//! their own table keyed by message id so appending never rewrites the
//! conversation row; ordering is by creation timestamp with the id as a
//! tie-breaker.

use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::Error;

const CONVERSATIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("conversations");
const MESSAGES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("messages");

/// Conversation store backed by redb.
pub struct ConversationStore {
    db: Arc<Database>,
}

/// A conversation between a user and an (optional) agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: String,
    /// Owning user reference
    pub user_id: String,
    /// Driving agent, if any
    pub agent_id: Option<String>,
    /// Display title
    pub title: String,
    /// Conversation status
    pub status: ConversationStatus,
    /// Creation timestamp
    pub created_at: i64,
    /// Last update timestamp
    pub updated_at: i64,
}

/// Conversation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Archived,
    /// Soft-deleted: the row is kept because messages reference it.
    Deleted,
}

/// A single message within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,
    /// Conversation reference
    pub conversation_id: String,
    /// Who authored the message
    pub role: MessageRole,
    /// Text content
    pub content: String,
    /// Optional attachment/extra metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Creation timestamp
    pub created_at: i64,
}

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl Conversation {
    /// Create a new active conversation with generated id and timestamps.
    pub fn new(user_id: impl Into<String>, title: impl Into<String>, agent_id: Option<String>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            agent_id,
            title: title.into(),
            status: ConversationStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Message {
    /// Create a new message with generated id and timestamp.
    pub fn new(
        conversation_id: impl Into<String>,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.into(),
            role,
            content: content.into(),
            metadata: None,
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Query filter for conversations.
#[derive(Debug, Clone, Default)]
pub struct ConversationFilter {
    /// Filter by owning user
    pub user_id: Option<String>,
    /// Maximum number of results
    pub limit: Option<usize>,
    /// Offset for pagination
    pub offset: Option<usize>,
}

/// What a delete call actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Row removed; the conversation had no messages.
    Removed,
    /// Status flipped to `deleted`; messages were kept.
    SoftDeleted,
    /// No such conversation.
    NotFound,
}

impl ConversationStore {
    /// Open or create a conversation store at the given path.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Arc<Self>, Error> {
        let db = Database::create(path)?;
        let write_txn = db.begin_write()?;
        write_txn.open_table(CONVERSATIONS_TABLE)?;
        write_txn.open_table(MESSAGES_TABLE)?;
        write_txn.commit()?;
        Ok(Arc::new(Self { db: Arc::new(db) }))
    }

    /// Create an in-memory conversation store for testing.
    pub fn memory() -> Result<Arc<Self>, Error> {
        let temp_path =
            std::env::temp_dir().join(format!("conversations_test_{}.redb", uuid::Uuid::new_v4()));
        Self::open(temp_path)
    }

    /// Insert a new conversation.
    pub async fn create_conversation(&self, conversation: &Conversation) -> Result<(), Error> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CONVERSATIONS_TABLE)?;
            let value = serde_json::to_vec(conversation)?;
            table.insert(conversation.id.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a conversation by ID. Soft-deleted conversations are not returned.
    pub async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONVERSATIONS_TABLE)?;

        match table.get(id)? {
            Some(bytes) => {
                let conversation: Conversation = serde_json::from_slice(bytes.value())?;
                if conversation.status == ConversationStatus::Deleted {
                    Ok(None)
                } else {
                    Ok(Some(conversation))
                }
            }
            None => Ok(None),
        }
    }

    /// Query conversations, newest-updated first. Soft-deleted rows are skipped.
    pub async fn query_conversations(
        &self,
        filter: ConversationFilter,
    ) -> Result<Vec<Conversation>, Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONVERSATIONS_TABLE)?;

        let mut conversations = Vec::new();
        for item in table.iter()? {
            let (_id, bytes) = item?;
            let conversation: Conversation = serde_json::from_slice(bytes.value())?;
            if conversation.status == ConversationStatus::Deleted {
                continue;
            }
            if let Some(user_id) = &filter.user_id {
                if &conversation.user_id != user_id {
                    continue;
                }
            }
            conversations.push(conversation);
        }

        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        if let Some(offset) = filter.offset {
            if offset < conversations.len() {
                conversations = conversations.into_iter().skip(offset).collect();
            } else {
                conversations.clear();
            }
        }
        if let Some(limit) = filter.limit {
            conversations.truncate(limit);
        }

        Ok(conversations)
    }

    /// Update a conversation's title. Returns false if it does not exist.
    pub async fn update_title(&self, id: &str, title: &str) -> Result<bool, Error> {
        let mut conversation = match self.get_conversation(id).await? {
            Some(conversation) => conversation,
            None => return Ok(false),
        };
        conversation.title = title.to_string();
        conversation.updated_at = chrono::Utc::now().timestamp();

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CONVERSATIONS_TABLE)?;
            let value = serde_json::to_vec(&conversation)?;
            table.insert(id, value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(true)
    }

    /// Update a conversation's status (archive/unarchive).
    pub async fn set_status(&self, id: &str, status: ConversationStatus) -> Result<bool, Error> {
        let mut conversation = match self.get_conversation(id).await? {
            Some(conversation) => conversation,
            None => return Ok(false),
        };
        conversation.status = status;
        conversation.updated_at = chrono::Utc::now().timestamp();

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CONVERSATIONS_TABLE)?;
            let value = serde_json::to_vec(&conversation)?;
            table.insert(id, value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(true)
    }

    /// Delete a conversation. Hard-deletes when it has no messages, otherwise
    /// flips the status to `deleted` and keeps the rows.
    pub async fn delete_conversation(&self, id: &str) -> Result<DeleteOutcome, Error> {
        let conversation = match self.get_conversation(id).await? {
            Some(conversation) => conversation,
            None => return Ok(DeleteOutcome::NotFound),
        };

        let message_count = self.message_count(id).await?;

        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut table = write_txn.open_table(CONVERSATIONS_TABLE)?;
            if message_count == 0 {
                table.remove(id)?;
                DeleteOutcome::Removed
            } else {
                let mut soft = conversation;
                soft.status = ConversationStatus::Deleted;
                soft.updated_at = chrono::Utc::now().timestamp();
                let value = serde_json::to_vec(&soft)?;
                table.insert(id, value.as_slice())?;
                DeleteOutcome::SoftDeleted
            }
        };
        write_txn.commit()?;
        Ok(outcome)
    }

    /// Append a message to a conversation and bump its `updated_at`.
    pub async fn append_message(&self, message: &Message) -> Result<(), Error> {
        let mut conversation = self
            .get_conversation(&message.conversation_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "Conversation {} not found",
                    message.conversation_id
                ))
            })?;
        conversation.updated_at = chrono::Utc::now().timestamp();

        let write_txn = self.db.begin_write()?;
        {
            let mut messages = write_txn.open_table(MESSAGES_TABLE)?;
            let value = serde_json::to_vec(message)?;
            messages.insert(message.id.as_str(), value.as_slice())?;

            let mut conversations = write_txn.open_table(CONVERSATIONS_TABLE)?;
            let value = serde_json::to_vec(&conversation)?;
            conversations.insert(conversation.id.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// List the messages of a conversation in chronological order.
    /// An existing conversation with no messages yields an empty vec.
    pub async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>, Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MESSAGES_TABLE)?;

        let mut messages = Vec::new();
        for item in table.iter()? {
            let (_id, bytes) = item?;
            let message: Message = serde_json::from_slice(bytes.value())?;
            if message.conversation_id == conversation_id {
                messages.push(message);
            }
        }

        messages.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(messages)
    }

    /// Count the messages of a conversation.
    pub async fn message_count(&self, conversation_id: &str) -> Result<usize, Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MESSAGES_TABLE)?;

        let mut count = 0;
        for item in table.iter()? {
            let (_id, bytes) = item?;
            let message: Message = serde_json::from_slice(bytes.value())?;
            if message.conversation_id == conversation_id {
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> Arc<ConversationStore> {
        ConversationStore::memory().unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_conversation() {
        let store = test_store();

        let conversation = Conversation::new("user-1", "New Conversation", None);
        store.create_conversation(&conversation).await.unwrap();

        let retrieved = store.get_conversation(&conversation.id).await.unwrap().unwrap();
        assert_eq!(retrieved.title, "New Conversation");
        assert_eq!(retrieved.status, ConversationStatus::Active);
    }

    #[tokio::test]
    async fn test_empty_conversation_has_no_messages() {
        let store = test_store();

        let conversation = Conversation::new("user-1", "Empty", None);
        store.create_conversation(&conversation).await.unwrap();

        let messages = store.list_messages(&conversation.id).await.unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_messages_are_ordered() {
        let store = test_store();

        let conversation = Conversation::new("user-1", "Chat", None);
        store.create_conversation(&conversation).await.unwrap();

        let mut first = Message::new(&conversation.id, MessageRole::User, "hello");
        first.created_at = 100;
        let mut second = Message::new(&conversation.id, MessageRole::Assistant, "hi there");
        second.created_at = 200;

        // Insert out of order on purpose
        store.append_message(&second).await.unwrap();
        store.append_message(&first).await.unwrap();

        let messages = store.list_messages(&conversation.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].content, "hi there");
    }

    #[tokio::test]
    async fn test_delete_empty_conversation_removes_row() {
        let store = test_store();

        let conversation = Conversation::new("user-1", "Temp", None);
        store.create_conversation(&conversation).await.unwrap();

        let outcome = store.delete_conversation(&conversation.id).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Removed);
        assert!(store.get_conversation(&conversation.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_conversation_with_messages_soft_deletes() {
        let store = test_store();

        let conversation = Conversation::new("user-1", "Kept", None);
        store.create_conversation(&conversation).await.unwrap();
        store
            .append_message(&Message::new(&conversation.id, MessageRole::User, "hi"))
            .await
            .unwrap();

        let outcome = store.delete_conversation(&conversation.id).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::SoftDeleted);

        // Hidden from reads, but messages survive
        assert!(store.get_conversation(&conversation.id).await.unwrap().is_none());
        assert_eq!(store.list_messages(&conversation.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_conversation() {
        let store = test_store();
        let outcome = store.delete_conversation("nope").await.unwrap();
        assert_eq!(outcome, DeleteOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_update_title() {
        let store = test_store();

        let conversation = Conversation::new("user-1", "Old", None);
        store.create_conversation(&conversation).await.unwrap();

        assert!(store.update_title(&conversation.id, "New title").await.unwrap());
        let retrieved = store.get_conversation(&conversation.id).await.unwrap().unwrap();
        assert_eq!(retrieved.title, "New title");

        assert!(!store.update_title("missing", "x").await.unwrap());
    }

    #[tokio::test]
    async fn test_archive_conversation() {
        let store = test_store();

        let conversation = Conversation::new("user-1", "Old thread", None);
        store.create_conversation(&conversation).await.unwrap();

        assert!(store
            .set_status(&conversation.id, ConversationStatus::Archived)
            .await
            .unwrap());
        let retrieved = store.get_conversation(&conversation.id).await.unwrap().unwrap();
        assert_eq!(retrieved.status, ConversationStatus::Archived);
    }

    #[tokio::test]
    async fn test_query_conversations_by_user() {
        let store = test_store();

        store
            .create_conversation(&Conversation::new("user-1", "A", None))
            .await
            .unwrap();
        store
            .create_conversation(&Conversation::new("user-2", "B", None))
            .await
            .unwrap();

        let mine = store
            .query_conversations(ConversationFilter {
                user_id: Some("user-1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "A");
    }
}
