use crate::db::connection::StoryDb;
use crate::StoryError;

/// Messages and memories tables.
const SCHEMA_001: &str = include_str!("migrations/001_messages_memories.surql");

/// Apply the database schema to an initialized database connection.
///
/// Every statement uses `IF NOT EXISTS`, so calling this repeatedly is safe.
///
/// # Example
///
/// ```no_run
/// # use storyloom::db::{connection::{init_db, DbConfig}, schema::apply_schema};
/// # use std::path::Path;
/// # async fn example() -> Result<(), storyloom::StoryError> {
/// let config = DbConfig::Embedded { path: Some("./data/story.db".into()) };
/// let db = init_db(&config, Path::new("./data")).await?;
/// apply_schema(&db).await?;
/// # Ok(())
/// # }
/// ```
pub async fn apply_schema(db: &StoryDb) -> Result<(), StoryError> {
    db.query(SCHEMA_001).await?.check()?;
    Ok(())
}
