//! In-memory repositories with failure switches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use storyloom::models::{
    Memory, MemoryCreate, MemorySearch, Message, MessageCreate, MessageRole, ScoredMemory,
};
use storyloom::repository::{MemoryRepository, MessageRepository};
use storyloom::utils::math::cosine_similarity;
use storyloom::StoryError;

/// Message store that records every bulk insert as one batch.
#[derive(Default)]
pub struct InMemoryMessages {
    rows: Mutex<Vec<Message>>,
    batches: Mutex<Vec<Vec<MessageCreate>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_writes() -> Self {
        let store = Self::default();
        store.fail_writes.store(true, Ordering::SeqCst);
        store
    }

    pub fn failing_reads() -> Self {
        let store = Self::default();
        store.fail_reads.store(true, Ordering::SeqCst);
        store
    }

    /// Seed a row directly, bypassing batch bookkeeping.
    pub fn seed(&self, role: MessageRole, content: &str, created_at: DateTime<Utc>) {
        let mut rows = self.rows.lock().unwrap();
        let id = format!("seed{}", rows.len());
        rows.push(Message {
            id,
            story_id: "story1".to_string(),
            role,
            content: content.to_string(),
            created_at,
        });
    }

    pub fn rows(&self) -> Vec<Message> {
        self.rows.lock().unwrap().clone()
    }

    pub fn batches(&self) -> Vec<Vec<MessageCreate>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessages {
    async fn get_messages_by_story(
        &self,
        story_id: &str,
        last_n: usize,
    ) -> Result<Vec<Message>, StoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoryError::Database("message store offline".into()));
        }
        let mut rows: Vec<Message> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.story_id == story_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.created_at);
        let skip = rows.len().saturating_sub(last_n);
        Ok(rows.into_iter().skip(skip).collect())
    }

    async fn bulk_insert_messages(
        &self,
        messages: Vec<MessageCreate>,
    ) -> Result<Vec<Message>, StoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoryError::Database("disk full".into()));
        }
        self.batches.lock().unwrap().push(messages.clone());

        let mut rows = self.rows.lock().unwrap();
        let stored: Vec<Message> = messages
            .into_iter()
            .enumerate()
            .map(|(i, m)| Message {
                id: format!("m{}", rows.len() + i),
                story_id: m.story_id,
                role: m.role,
                content: m.content,
                created_at: m.created_at,
            })
            .collect();
        rows.extend(stored.iter().cloned());
        Ok(stored)
    }
}

/// Brute-force cosine search over memories kept in a Vec.
#[derive(Default)]
pub struct InMemoryMemories {
    rows: Mutex<Vec<(Memory, Vec<f32>)>>,
}

impl InMemoryMemories {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemoryRepository for InMemoryMemories {
    async fn search_similar_memories(
        &self,
        embedding: &[f32],
        search: &MemorySearch,
    ) -> Result<Vec<ScoredMemory>, StoryError> {
        let mut hits: Vec<ScoredMemory> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m.user_id == search.user_id)
            .map(|(m, v)| ScoredMemory {
                memory: m.clone(),
                score: cosine_similarity(embedding, v),
            })
            .filter(|hit| hit.score >= search.min_similarity)
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(search.top_k);
        Ok(hits)
    }

    async fn insert_memory(&self, data: MemoryCreate) -> Result<Memory, StoryError> {
        let mut rows = self.rows.lock().unwrap();
        let memory = Memory {
            id: format!("mem{}", rows.len()),
            user_id: data.user_id,
            content: data.content,
            category: data.category,
            importance: data.importance,
            confidence: data.confidence,
            action: data.action,
            created_at: data.created_at,
        };
        rows.push((memory.clone(), data.embedding));
        Ok(memory)
    }
}

/// Similarity search that always fails.
pub struct FailingMemories;

#[async_trait]
impl MemoryRepository for FailingMemories {
    async fn search_similar_memories(
        &self,
        _embedding: &[f32],
        _search: &MemorySearch,
    ) -> Result<Vec<ScoredMemory>, StoryError> {
        Err(StoryError::Search("vector index unavailable".into()))
    }

    async fn insert_memory(&self, _data: MemoryCreate) -> Result<Memory, StoryError> {
        Err(StoryError::Search("vector index unavailable".into()))
    }
}
