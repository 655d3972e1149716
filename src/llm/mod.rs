//! Streaming language-model boundary.
//!
//! The runtime never talks to a vendor API directly; it consumes a stream of
//! content/thinking chunks from whatever implements [`ChatModel`].

pub mod scripted;

use std::pin::Pin;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio_stream::Stream;

use crate::StoryError;

pub use scripted::ScriptedModel;

/// Incremental model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChunk {
    /// User-facing response text.
    Content(String),
    /// Reasoning tokens; forwarded but never persisted.
    Thinking(String),
}

pub type ModelStream = Pin<Box<dyn Stream<Item = Result<ModelChunk, StoryError>> + Send>>;

/// What the handler asked the model to produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRequest {
    /// Provider chosen by the story.
    pub provider: String,
    pub prompt: String,
    /// JSON Schema for structured output, if any.
    pub output_schema: Option<Value>,
}

/// Core trait for streaming model backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Start a streaming completion.
    async fn stream(&self, request: ModelRequest) -> Result<ModelStream, StoryError>;

    /// Backend name, for logs.
    fn name(&self) -> &str;
}
