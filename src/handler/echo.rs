//! Diagnostic handler that never calls the model.

use async_trait::async_trait;

use crate::handler::lifecycle::TurnState;
use crate::handler::{FinishOutcome, HandlerMetadata, HandlerServices, StoryHandler, TurnCore};
use crate::models::{
    Clip, ClipEnvelope, HandlerConfig, InitOutcome, StoryContext, TurnEvent, TurnInput,
};
use crate::StoryError;

/// Replies with the user's own text as a single clip.
pub struct EchoHandler {
    core: TurnCore,
}

impl EchoHandler {
    pub const NAME: &'static str = "echo";

    pub fn new(context: StoryContext, services: HandlerServices) -> Self {
        Self {
            core: TurnCore::new(context, services),
        }
    }

    /// Registry factory. Config is ignored.
    pub fn create(
        context: StoryContext,
        _config: HandlerConfig,
        services: HandlerServices,
    ) -> Result<Box<dyn StoryHandler>, StoryError> {
        Ok(Box::new(Self::new(context, services)))
    }

    pub fn describe() -> HandlerMetadata {
        HandlerMetadata {
            name: Self::NAME.to_string(),
            description: "Echoes the input back as one clip without calling the model".to_string(),
            accepts_events: true,
            config_schema: None,
        }
    }
}

#[async_trait]
impl StoryHandler for EchoHandler {
    async fn init(&mut self, input: TurnInput) -> Result<InitOutcome, StoryError> {
        self.core.require(TurnState::Created, "init")?;
        let response = ClipEnvelope::single(Clip::speech(input.user_text())).to_json();
        let outcome = InitOutcome::Bypass { response };
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
        let messages = self.core.finish().await?;
        Ok(FinishOutcome::new(messages, None))
    }

    fn metadata(&self) -> HandlerMetadata {
        Self::describe()
    }

    fn context(&self) -> &StoryContext {
        self.core.context()
    }
}
