//! Long-term memory section, strictly best-effort.
//!
//! Retrieval failures never reach the caller: they come back as
//! [`MemoryContext::Degraded`], which renders as nothing.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::embedding::EmbeddingService;
use crate::models::{MemorySearch, ScoredMemory, StoryContext};
use crate::repository::MemoryRepository;
use crate::utils::time::format_time_ago_at;

pub const MEMORY_HEADER: &str = "## 相关记忆";

/// How many memories to pull and how close they must be.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryContextOptions {
    pub top_k: usize,
    pub min_similarity: f32,
}

impl Default for MemoryContextOptions {
    fn default() -> Self {
        Self {
            top_k: MemorySearch::DEFAULT_TOP_K,
            min_similarity: MemorySearch::DEFAULT_MIN_SIMILARITY,
        }
    }
}

/// Outcome of a memory lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryContext {
    Rendered(String),
    /// No query text, or nothing similar enough.
    Skipped,
    /// Embedding or search failed; carries the reason for logs.
    Degraded(String),
}

impl MemoryContext {
    pub fn is_degraded(&self) -> bool {
        matches!(self, MemoryContext::Degraded(_))
    }

    /// Prompt text: the rendered section, or empty.
    pub fn into_text(self) -> String {
        match self {
            MemoryContext::Rendered(text) => text,
            MemoryContext::Skipped | MemoryContext::Degraded(_) => String::new(),
        }
    }
}

/// Look up memories of the story's user similar to `query`.
pub async fn build_memory_context(
    embedding: &dyn EmbeddingService,
    memories: &dyn MemoryRepository,
    query: Option<&str>,
    context: &StoryContext,
    options: MemoryContextOptions,
) -> MemoryContext {
    let query = match query.map(str::trim) {
        Some(q) if !q.is_empty() => q,
        _ => return MemoryContext::Skipped,
    };

    let vector = match embedding.embed_text(context.provider(), query).await {
        Ok(v) => v,
        Err(e) => {
            warn!("Memory context degraded, embedding failed: {}", e);
            return MemoryContext::Degraded(e.to_string());
        }
    };

    let search = MemorySearch {
        user_id: context.user_id().to_string(),
        top_k: options.top_k,
        min_similarity: options.min_similarity,
    };
    let hits = match memories.search_similar_memories(&vector, &search).await {
        Ok(hits) => hits,
        Err(e) => {
            warn!("Memory context degraded, search failed: {}", e);
            return MemoryContext::Degraded(e.to_string());
        }
    };

    debug!(
        "Memory lookup for user {} returned {} hits",
        context.user_id(),
        hits.len()
    );
    match render_memories(&hits, Utc::now()) {
        Some(text) => MemoryContext::Rendered(text),
        None => MemoryContext::Skipped,
    }
}

/// Render hits as `- [category] content（relative-time）` bullets.
pub fn render_memories(hits: &[ScoredMemory], now: DateTime<Utc>) -> Option<String> {
    if hits.is_empty() {
        return None;
    }
    let bullets: Vec<String> = hits
        .iter()
        .map(|hit| {
            format!(
                "- [{}] {}（{}）",
                hit.memory.category.to_lowercase(),
                hit.memory.content,
                format_time_ago_at(hit.memory.created_at, now)
            )
        })
        .collect();
    Some(format!("{}\n{}", MEMORY_HEADER, bullets.join("\n")))
}
