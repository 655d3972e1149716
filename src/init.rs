//! Shared initialization logic for the CLI.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{load_runtime_config, resolve_data_path, RuntimeConfig};
use crate::db::connection::{init_db, load_db_config, StoryDb};
use crate::db::schema::apply_schema;
use crate::embedding::{create_embedding_service, EmbeddingService};
use crate::handler::{EchoHandler, HandlerRegistry, HandlerServices, LiveHandler};
use crate::repository::{
    MemoryRepository, MessageRepository, SurrealMemoryRepository, SurrealMessageRepository,
};
use crate::session::ClientState;
use crate::StoryError;

/// Application context holding all services and repositories.
pub struct AppContext {
    pub db: Arc<StoryDb>,
    pub data_path: PathBuf,
    pub config: RuntimeConfig,
    pub message_repo: Arc<dyn MessageRepository>,
    pub memory_repo: Arc<dyn MemoryRepository>,
    pub embedding_service: Arc<dyn EmbeddingService>,
    pub registry: Arc<HandlerRegistry>,
    pub client_state: Arc<ClientState>,
}

impl AppContext {
    /// Initialize application context.
    ///
    /// Data path priority: explicit path > STORYLOOM_DATA_PATH env > ./.storyloom (if exists) > ~/.storyloom
    pub async fn new(explicit_path: Option<PathBuf>) -> Result<Self> {
        let data_path = resolve_data_path(explicit_path);
        tracing::info!("Using data path: {}", data_path.display());

        let config = load_runtime_config(&data_path);
        config.validate()?;

        let db_config = load_db_config(&data_path);
        let db = init_db(&db_config, &data_path).await?;
        tracing::info!("Database connected");

        apply_schema(&db).await?;
        tracing::info!("Schema applied");

        let db = Arc::new(db);

        let client_state = Arc::new(ClientState::load_or_create(
            &data_path.join("client_state.json"),
        )?);

        let embedding_service =
            create_embedding_service(&config.embedding, config.embedding_cache_capacity);
        if !embedding_service.is_available() {
            tracing::warn!("Embedding service not available; memory context disabled");
        }

        let message_repo: Arc<dyn MessageRepository> =
            Arc::new(SurrealMessageRepository::new(db.clone()));
        let memory_repo: Arc<dyn MemoryRepository> =
            Arc::new(SurrealMemoryRepository::new(db.clone()));

        let services = HandlerServices {
            messages: message_repo.clone(),
            memories: memory_repo.clone(),
            embedding: embedding_service.clone(),
            utc_offset_hours: config.utc_offset_hours,
        };
        let mut registry = HandlerRegistry::new(services);
        register_builtin_handlers(&mut registry)?;
        tracing::info!("Handlers registered: {}", registry.list().join(", "));

        Ok(Self {
            db,
            data_path,
            config,
            message_repo,
            memory_repo,
            embedding_service,
            registry: Arc::new(registry),
            client_state,
        })
    }
}

/// Register the handlers that ship with the runtime.
pub fn register_builtin_handlers(registry: &mut HandlerRegistry) -> Result<(), StoryError> {
    registry.register(LiveHandler::NAME, LiveHandler::create, Some(LiveHandler::describe()))?;
    registry.register(EchoHandler::NAME, EchoHandler::create, None)?;
    Ok(())
}
