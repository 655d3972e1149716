//! Long-term memories extracted from past conversations.
//!
//! The handler runtime only reads memories. Writing them belongs to the
//! extraction pipeline; `MemoryCreate` exists for that pipeline and for seeding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the extraction pipeline decided to do with a memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryAction {
    #[default]
    Add,
    Update,
    Delete,
    None,
}

/// A retrieved memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    pub user_id: String,
    pub content: String,
    /// Free-form category label (e.g. "PREFERENCE", "Event").
    pub category: String,
    /// 0.0 - 1.0
    pub importance: f32,
    /// 0.0 - 1.0
    pub confidence: f32,
    pub action: MemoryAction,
    pub created_at: DateTime<Utc>,
}

/// Data for inserting a memory together with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryCreate {
    pub user_id: String,
    pub content: String,
    pub category: String,
    pub importance: f32,
    pub confidence: f32,
    pub action: MemoryAction,
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

/// A memory paired with its similarity to the query vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMemory {
    pub memory: Memory,
    pub score: f32,
}

/// Similarity search parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySearch {
    pub user_id: String,
    pub top_k: usize,
    pub min_similarity: f32,
}

impl MemorySearch {
    pub const DEFAULT_TOP_K: usize = 5;
    pub const DEFAULT_MIN_SIMILARITY: f32 = 0.5;

    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            top_k: Self::DEFAULT_TOP_K,
            min_similarity: Self::DEFAULT_MIN_SIMILARITY,
        }
    }
}
