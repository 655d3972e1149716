//! Test harness for database lifecycle management.
//!
//! Provides isolated database instances per test using tempfile.

use std::sync::Arc;
use tempfile::TempDir;

use storyloom::db::connection::{init_db, DbConfig, StoryDb};
use storyloom::db::schema::apply_schema;
use storyloom::embedding::{EmbeddingService, HashingEmbeddingService};
use storyloom::handler::HandlerServices;
use storyloom::repository::{
    MemoryRepository, MessageRepository, SurrealMemoryRepository, SurrealMessageRepository,
};

/// Test harness that manages database lifecycle.
///
/// Each TestHarness creates an isolated database in a temporary directory.
/// The database is automatically cleaned up when the harness is dropped.
pub struct TestHarness {
    /// Database connection wrapped in Arc for repository sharing
    pub db: Arc<StoryDb>,
    /// Temporary directory (kept alive while harness exists)
    pub temp_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness with isolated database.
    ///
    /// Panics if database initialization fails (appropriate for tests).
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory for test database");

        let db_path = temp_dir.path().join("test.db");
        let config = DbConfig::Embedded {
            path: Some(db_path.to_string_lossy().into_owned()),
        };
        let db = init_db(&config, temp_dir.path())
            .await
            .expect("Failed to initialize test database");

        apply_schema(&db)
            .await
            .expect("Failed to apply schema to test database");

        Self {
            db: Arc::new(db),
            temp_dir,
        }
    }

    pub fn message_repo(&self) -> Arc<SurrealMessageRepository> {
        Arc::new(SurrealMessageRepository::new(self.db.clone()))
    }

    pub fn memory_repo(&self) -> Arc<SurrealMemoryRepository> {
        Arc::new(SurrealMemoryRepository::new(self.db.clone()))
    }

    /// Handler services backed by this database and hashing embeddings.
    pub fn services(&self) -> HandlerServices {
        HandlerServices {
            messages: self.message_repo(),
            memories: self.memory_repo(),
            embedding: test_embedding_service(),
            utc_offset_hours: 8,
        }
    }
}

/// Deterministic local embeddings; no model download needed.
pub fn test_embedding_service() -> Arc<dyn EmbeddingService> {
    Arc::new(HashingEmbeddingService::new(128))
}

/// Handler services over in-memory fakes.
pub fn fake_services(
    messages: Arc<dyn MessageRepository>,
    memories: Arc<dyn MemoryRepository>,
) -> HandlerServices {
    HandlerServices {
        messages,
        memories,
        embedding: test_embedding_service(),
        utc_offset_hours: 8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_harness_creates_database() {
        let harness = TestHarness::new().await;
        assert!(Arc::strong_count(&harness.db) == 1);
    }
}
