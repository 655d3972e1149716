//! The live-room handler: chat, danmaku, gifts, program changes.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::handler::lifecycle::TurnState;
use crate::handler::{FinishOutcome, HandlerMetadata, HandlerServices, StoryHandler, TurnCore};
use crate::models::{
    ClipEnvelope, HandlerConfig, InitOutcome, PromptRequest, StoryContext, TurnEvent, TurnInput,
    TurnPayload,
};
use crate::prompt::{
    build_chat_history, build_event_prompt, build_memory_context, build_text_prompt,
    build_time_context, MemoryContextOptions, PromptParts,
};
use crate::StoryError;

/// Tunables read from the story's handler config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveHandlerOptions {
    /// Messages of history to include.
    pub history_limit: usize,
    /// Memories to retrieve per turn.
    pub memory_top_k: usize,
    /// Minimum cosine similarity for a memory to be included.
    pub memory_min_similarity: f32,
    /// Turn memory lookups off entirely.
    pub memory_enabled: bool,
}

impl Default for LiveHandlerOptions {
    fn default() -> Self {
        let memory = MemoryContextOptions::default();
        Self {
            history_limit: 20,
            memory_top_k: memory.top_k,
            memory_min_similarity: memory.min_similarity,
            memory_enabled: true,
        }
    }
}

impl LiveHandlerOptions {
    pub fn from_config(config: &HandlerConfig) -> Result<Self, StoryError> {
        let options: Self = config.parse()?;
        if !(0.0..=1.0).contains(&options.memory_min_similarity) {
            return Err(StoryError::Validation(format!(
                "memoryMinSimilarity must be between 0 and 1, got {}",
                options.memory_min_similarity
            )));
        }
        Ok(options)
    }

    pub fn memory_options(&self) -> MemoryContextOptions {
        MemoryContextOptions {
            top_k: self.memory_top_k,
            min_similarity: self.memory_min_similarity,
        }
    }
}

pub struct LiveHandler {
    core: TurnCore,
    options: LiveHandlerOptions,
}

impl LiveHandler {
    pub const NAME: &'static str = "live";

    pub fn new(
        context: StoryContext,
        config: HandlerConfig,
        services: HandlerServices,
    ) -> Result<Self, StoryError> {
        Ok(Self {
            core: TurnCore::new(context, services),
            options: LiveHandlerOptions::from_config(&config)?,
        })
    }

    /// Registry factory.
    pub fn create(
        context: StoryContext,
        config: HandlerConfig,
        services: HandlerServices,
    ) -> Result<Box<dyn StoryHandler>, StoryError> {
        Ok(Box::new(Self::new(context, config, services)?))
    }

    pub fn describe() -> HandlerMetadata {
        HandlerMetadata {
            name: Self::NAME.to_string(),
            description: "Live-room companion: answers chat, danmaku, gifts and program \
                          changes with spoken clips, grounded in history and memories"
                .to_string(),
            accepts_events: true,
            config_schema: serde_json::to_value(schemars::schema_for!(LiveHandlerOptions)).ok(),
        }
    }

    pub fn options(&self) -> &LiveHandlerOptions {
        &self.options
    }

    /// Assemble the prompt for `input` without touching the turn state.
    pub async fn build_prompt(&self, input: &TurnInput) -> String {
        let context = self.core.context();
        let services = self.core.services();

        let event = match input.payload() {
            TurnPayload::Text(text) => build_text_prompt(text),
            TurnPayload::Event(event) => build_event_prompt(event),
        };

        let time = build_time_context(services.utc_offset_hours);
        let history =
            build_chat_history(services.messages.as_ref(), context, self.options.history_limit)
                .await;
        let memory = if self.options.memory_enabled && event.requires_memory {
            build_memory_context(
                services.embedding.as_ref(),
                services.memories.as_ref(),
                event.search_text.as_deref(),
                context,
                self.options.memory_options(),
            )
            .await
            .into_text()
        } else {
            String::new()
        };

        let prompt = PromptParts {
            time,
            history,
            memory,
            event: event.render(),
        }
        .assemble();
        debug!(
            "Assembled {} chars of prompt for story {}",
            prompt.chars().count(),
            context.story_id()
        );
        prompt
    }
}

#[async_trait]
impl StoryHandler for LiveHandler {
    async fn init(&mut self, input: TurnInput) -> Result<InitOutcome, StoryError> {
        self.core.require(TurnState::Created, "init")?;
        let prompt = self.build_prompt(&input).await;
        let outcome = InitOutcome::Prompt(PromptRequest {
            prompt,
            output_schema: Some(ClipEnvelope::output_schema()),
        });
        self.core.initialize(input, &outcome)?;
        Ok(outcome)
    }

    fn on_start(&mut self) -> Result<TurnEvent, StoryError> {
        self.core.start()
    }

    fn on_content(&mut self, delta: &str) -> Result<String, StoryError> {
        self.core.content(delta)
    }

    fn on_thinking(&mut self, delta: &str) -> Result<String, StoryError> {
        self.core.thinking(delta)
    }

    async fn on_finish(&mut self) -> Result<FinishOutcome, StoryError> {
        let metadata: Option<Value> = ClipEnvelope::parse(self.core.response().trim())
            .ok()
            .map(|envelope| json!({ "clipCount": envelope.clips.len() }));
        let messages = self.core.finish().await?;
        Ok(FinishOutcome::new(messages, metadata))
    }

    fn metadata(&self) -> HandlerMetadata {
        Self::describe()
    }

    fn context(&self) -> &StoryContext {
        self.core.context()
    }
}
