//! Story handlers: pluggable per-story conversation strategies.
//!
//! A handler instance serves exactly one turn. The [`HandlerRegistry`] builds
//! instances by name; [`drive_turn`] walks one through its lifecycle.

pub mod echo;
pub mod lifecycle;
pub mod live;
pub mod registry;
pub mod turn;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::embedding::EmbeddingService;
use crate::models::{
    InitOutcome, Message, MessageCreate, MessageRole, StoryContext, TurnEvent, TurnInput,
};
use crate::repository::{MemoryRepository, MessageRepository};
use crate::StoryError;

pub use echo::EchoHandler;
pub use lifecycle::{TurnLifecycle, TurnState};
pub use live::{LiveHandler, LiveHandlerOptions};
pub use registry::{HandlerFactory, HandlerRegistry};
pub use turn::drive_turn;

/// Collaborators every handler may use.
#[derive(Clone)]
pub struct HandlerServices {
    pub messages: Arc<dyn MessageRepository>,
    pub memories: Arc<dyn MemoryRepository>,
    pub embedding: Arc<dyn EmbeddingService>,
    /// Offset applied when rendering the current time.
    pub utc_offset_hours: i32,
}

/// Descriptive information about a handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerMetadata {
    pub name: String,
    pub description: String,
    /// Whether the handler understands structured live events.
    pub accepts_events: bool,
    /// JSON Schema of the handler's config, if it takes any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_schema: Option<Value>,
}

/// What `on_finish` hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishOutcome {
    pub event: TurnEvent,
    /// Rows written for this turn.
    pub messages: Vec<Message>,
    pub metadata: Option<Value>,
}

impl FinishOutcome {
    /// The finish event carries the persisted row count and the metadata.
    pub fn new(messages: Vec<Message>, metadata: Option<Value>) -> Self {
        let payload = json!({
            "persisted": messages.len(),
            "metadata": metadata,
        });
        Self {
            event: TurnEvent::Finish(payload.to_string()),
            messages,
            metadata,
        }
    }
}

/// One turn's worth of conversation strategy.
///
/// Calls must follow `init`, `on_start`, `on_content`/`on_thinking`*,
/// `on_finish`; anything else is an [`StoryError::InvalidTransition`].
#[async_trait]
pub trait StoryHandler: Send {
    /// Build the model request, or answer locally.
    async fn init(&mut self, input: TurnInput) -> Result<InitOutcome, StoryError>;

    /// The model started producing output.
    fn on_start(&mut self) -> Result<TurnEvent, StoryError>;

    /// A response chunk. Returns the delta to forward.
    fn on_content(&mut self, delta: &str) -> Result<String, StoryError>;

    /// A reasoning chunk. Forwarded, never persisted.
    fn on_thinking(&mut self, delta: &str) -> Result<String, StoryError>;

    /// Persist the turn. Persistence failures propagate.
    async fn on_finish(&mut self) -> Result<FinishOutcome, StoryError>;

    fn metadata(&self) -> HandlerMetadata;

    fn context(&self) -> &StoryContext;
}

/// Turn bookkeeping shared by the builtin handlers: the lifecycle, the raw
/// input and the accumulated response.
pub struct TurnCore {
    context: StoryContext,
    services: HandlerServices,
    lifecycle: TurnLifecycle,
    input: Option<TurnInput>,
    response: String,
}

impl TurnCore {
    pub fn new(context: StoryContext, services: HandlerServices) -> Self {
        Self {
            context,
            services,
            lifecycle: TurnLifecycle::new(),
            input: None,
            response: String::new(),
        }
    }

    pub fn context(&self) -> &StoryContext {
        &self.context
    }

    pub fn services(&self) -> &HandlerServices {
        &self.services
    }

    pub fn state(&self) -> TurnState {
        self.lifecycle.state()
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn require(&self, expected: TurnState, operation: &'static str) -> Result<(), StoryError> {
        self.lifecycle.require(expected, operation)
    }

    /// Record the outcome of `init`. A bypass response becomes the turn's
    /// response as-is.
    pub fn initialize(&mut self, input: TurnInput, outcome: &InitOutcome) -> Result<(), StoryError> {
        let bypass = matches!(outcome, InitOutcome::Bypass { .. });
        self.lifecycle.initialize(bypass)?;
        if let InitOutcome::Bypass { response } = outcome {
            self.response = response.clone();
        }
        self.input = Some(input);
        Ok(())
    }

    pub fn start(&mut self) -> Result<TurnEvent, StoryError> {
        self.lifecycle.start()?;
        Ok(TurnEvent::Start(self.context.story_id().to_string()))
    }

    pub fn content(&mut self, delta: &str) -> Result<String, StoryError> {
        self.lifecycle.require(TurnState::Streaming, "on_content")?;
        self.response.push_str(delta);
        Ok(delta.to_string())
    }

    pub fn thinking(&mut self, delta: &str) -> Result<String, StoryError> {
        self.lifecycle.require(TurnState::Streaming, "on_thinking")?;
        Ok(delta.to_string())
    }

    /// Transition to `Finished` and write the turn.
    pub async fn finish(&mut self) -> Result<Vec<Message>, StoryError> {
        self.lifecycle.finish()?;
        let user_text = self
            .input
            .as_ref()
            .map(TurnInput::user_text)
            .unwrap_or_default();
        persist_turn(
            self.services.messages.as_ref(),
            &self.context,
            &user_text,
            &self.response,
        )
        .await
    }
}

/// Write the user text and the trimmed response in one atomic insert.
///
/// Empty sides are dropped; with nothing left, nothing is written.
pub async fn persist_turn(
    messages: &dyn MessageRepository,
    context: &StoryContext,
    user_text: &str,
    response: &str,
) -> Result<Vec<Message>, StoryError> {
    let now = chrono::Utc::now();
    let mut rows = Vec::with_capacity(2);
    if !user_text.trim().is_empty() {
        rows.push(MessageCreate::new(
            context.story_id(),
            MessageRole::User,
            user_text,
            now,
        ));
    }
    let response = response.trim();
    if !response.is_empty() {
        // Keep the reply strictly after the prompt in history order.
        rows.push(MessageCreate::new(
            context.story_id(),
            MessageRole::Assistant,
            response,
            now + Duration::milliseconds(1),
        ));
    }

    if rows.is_empty() {
        debug!("Nothing to persist for story {}", context.story_id());
        return Ok(Vec::new());
    }

    messages
        .bulk_insert_messages(rows)
        .await
        .map_err(|e| match e {
            StoryError::Persistence { .. } => e,
            other => StoryError::persistence(other),
        })
}
