use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::connection::StoryDb;
use crate::models::{Memory, MemoryAction, MemoryCreate, MemorySearch, ScoredMemory};
use crate::StoryError;

/// Repository trait for long-term memories.
///
/// Similarity search is the only read the handler runtime performs;
/// `insert_memory` is used by the extraction pipeline and for seeding.
#[async_trait]
pub trait MemoryRepository: Send + Sync {
    /// Memories of `search.user_id` ordered by descending cosine similarity to
    /// `embedding`, at most `top_k`, none below `min_similarity`.
    async fn search_similar_memories(
        &self,
        embedding: &[f32],
        search: &MemorySearch,
    ) -> Result<Vec<ScoredMemory>, StoryError>;

    async fn insert_memory(&self, data: MemoryCreate) -> Result<Memory, StoryError>;
}

#[derive(Debug, Serialize)]
struct MemoryRow {
    user_id: String,
    content: String,
    category: String,
    importance: f32,
    confidence: f32,
    action: MemoryAction,
    embedding: Vec<f32>,
    created_at: surrealdb::Datetime,
}

/// Row shape read back; `created_at` is cast to an RFC 3339 string in the query.
#[derive(Debug, Deserialize)]
struct ScoredRecord {
    id: String,
    user_id: String,
    content: String,
    category: String,
    importance: f32,
    confidence: f32,
    action: MemoryAction,
    created_at: DateTime<Utc>,
    score: f32,
}

impl From<ScoredRecord> for ScoredMemory {
    fn from(record: ScoredRecord) -> Self {
        Self {
            memory: Memory {
                id: record.id,
                user_id: record.user_id,
                content: record.content,
                category: record.category,
                importance: record.importance,
                confidence: record.confidence,
                action: record.action,
                created_at: record.created_at,
            },
            score: record.score,
        }
    }
}

/// SurrealDB implementation of MemoryRepository.
pub struct SurrealMemoryRepository {
    db: Arc<StoryDb>,
}

impl SurrealMemoryRepository {
    pub fn new(db: Arc<StoryDb>) -> Self {
        Self { db }
    }
}

const MEMORY_FIELDS: &str = "meta::id(id) AS id, user_id, content, category, importance, \
                             confidence, action, <string> created_at AS created_at";

#[async_trait]
impl MemoryRepository for SurrealMemoryRepository {
    async fn search_similar_memories(
        &self,
        embedding: &[f32],
        search: &MemorySearch,
    ) -> Result<Vec<ScoredMemory>, StoryError> {
        if search.top_k == 0 {
            return Ok(Vec::new());
        }

        // Brute-force cosine over one user's memories
        let query = format!(
            "SELECT {MEMORY_FIELDS}, \
                    vector::similarity::cosine(embedding, $query_vector) AS score \
             FROM memory \
             WHERE user_id = $user_id AND array::len(embedding) = $dimensions \
             ORDER BY score DESC \
             LIMIT {}",
            search.top_k
        );

        let mut response = self
            .db
            .query(&query)
            .bind(("query_vector", embedding.to_vec()))
            .bind(("user_id", search.user_id.clone()))
            .bind(("dimensions", embedding.len()))
            .await
            .map_err(|e| StoryError::Search(e.to_string()))?;
        let records: Vec<ScoredRecord> = response
            .take(0)
            .map_err(|e| StoryError::Search(e.to_string()))?;

        Ok(records
            .into_iter()
            .filter(|r| r.score >= search.min_similarity)
            .map(ScoredMemory::from)
            .collect())
    }

    async fn insert_memory(&self, data: MemoryCreate) -> Result<Memory, StoryError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let row = MemoryRow {
            user_id: data.user_id.clone(),
            content: data.content.clone(),
            category: data.category.clone(),
            importance: data.importance,
            confidence: data.confidence,
            action: data.action,
            embedding: data.embedding,
            created_at: surrealdb::Datetime::from(data.created_at),
        };

        self.db
            .query("CREATE type::thing('memory', $id) CONTENT $row")
            .bind(("id", id.clone()))
            .bind(("row", row))
            .await
            .and_then(|response| response.check())
            .map_err(StoryError::persistence)?;

        Ok(Memory {
            id,
            user_id: data.user_id,
            content: data.content,
            category: data.category,
            importance: data.importance,
            confidence: data.confidence,
            action: data.action,
            created_at: data.created_at,
        })
    }
}
