use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::connection::StoryDb;
use crate::models::{Message, MessageCreate, MessageRole};
use crate::StoryError;

/// Repository trait for turn history.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// The `last_n` most recent messages of a story, returned oldest first.
    async fn get_messages_by_story(
        &self,
        story_id: &str,
        last_n: usize,
    ) -> Result<Vec<Message>, StoryError>;

    /// Insert every message or none of them.
    async fn bulk_insert_messages(
        &self,
        messages: Vec<MessageCreate>,
    ) -> Result<Vec<Message>, StoryError>;
}

/// Row shape written to the `message` table.
#[derive(Debug, Serialize)]
struct MessageRow {
    id: String,
    story_id: String,
    role: MessageRole,
    content: String,
    created_at: surrealdb::Datetime,
}

/// Row shape read back; `created_at` is cast to an RFC 3339 string in the query.
#[derive(Debug, Deserialize)]
struct MessageRecord {
    id: String,
    story_id: String,
    role: MessageRole,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        Self {
            id: record.id,
            story_id: record.story_id,
            role: record.role,
            content: record.content,
            created_at: record.created_at,
        }
    }
}

/// SurrealDB implementation of MessageRepository.
pub struct SurrealMessageRepository {
    db: Arc<StoryDb>,
}

impl SurrealMessageRepository {
    pub fn new(db: Arc<StoryDb>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageRepository for SurrealMessageRepository {
    async fn get_messages_by_story(
        &self,
        story_id: &str,
        last_n: usize,
    ) -> Result<Vec<Message>, StoryError> {
        if last_n == 0 {
            return Ok(Vec::new());
        }

        // Inner query picks the newest rows on the real datetime; the outer one
        // only reshapes them.
        let query = format!(
            "SELECT meta::id(id) AS id, story_id, role, content, \
                    <string> created_at AS created_at \
             FROM (SELECT * FROM message WHERE story_id = $story_id \
                   ORDER BY created_at DESC LIMIT {last_n})"
        );

        let mut response = self
            .db
            .query(&query)
            .bind(("story_id", story_id.to_string()))
            .await?;
        let records: Vec<MessageRecord> = response.take(0)?;

        let mut messages: Vec<Message> = records.into_iter().map(Message::from).collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn bulk_insert_messages(
        &self,
        messages: Vec<MessageCreate>,
    ) -> Result<Vec<Message>, StoryError> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }

        let stored: Vec<Message> = messages
            .into_iter()
            .map(|m| Message {
                id: uuid::Uuid::new_v4().simple().to_string(),
                story_id: m.story_id,
                role: m.role,
                content: m.content,
                created_at: m.created_at,
            })
            .collect();

        let rows: Vec<MessageRow> = stored
            .iter()
            .map(|m| MessageRow {
                id: m.id.clone(),
                story_id: m.story_id.clone(),
                role: m.role,
                content: m.content.clone(),
                created_at: surrealdb::Datetime::from(m.created_at),
            })
            .collect();

        self.db
            .query("BEGIN TRANSACTION; INSERT INTO message $rows; COMMIT TRANSACTION;")
            .bind(("rows", rows))
            .await
            .and_then(|response| response.check())
            .map_err(StoryError::persistence)?;

        Ok(stored)
    }
}
