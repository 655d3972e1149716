//! A model that replays a fixed script. Backs the CLI's dry runs and tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{ChatModel, ModelChunk, ModelRequest, ModelStream};
use crate::StoryError;

#[derive(Default)]
pub struct ScriptedModel {
    chunks: Vec<ModelChunk>,
    /// Fail the call itself instead of streaming.
    fail_on_call: Option<String>,
    /// Emit this many chunks, then an error.
    fail_after: Option<(usize, String)>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new(chunks: Vec<ModelChunk>) -> Self {
        Self {
            chunks,
            ..Default::default()
        }
    }

    /// Split `response` into content chunks of at most `chunk_chars` characters.
    pub fn from_text(response: &str, chunk_chars: usize) -> Self {
        let chars: Vec<char> = response.chars().collect();
        let chunks = chars
            .chunks(chunk_chars.max(1))
            .map(|c| ModelChunk::Content(c.iter().collect()))
            .collect();
        Self::new(chunks)
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_on_call: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn fail_after(mut self, emitted: usize, message: impl Into<String>) -> Self {
        self.fail_after = Some((emitted, message.into()));
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn stream(&self, request: ModelRequest) -> Result<ModelStream, StoryError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        if let Some(message) = &self.fail_on_call {
            return Err(StoryError::Model(message.clone()));
        }

        let mut items: Vec<Result<ModelChunk, StoryError>> = Vec::new();
        match &self.fail_after {
            Some((emitted, message)) => {
                items.extend(self.chunks.iter().take(*emitted).cloned().map(Ok));
                items.push(Err(StoryError::Model(message.clone())));
            }
            None => items.extend(self.chunks.iter().cloned().map(Ok)),
        }

        Ok(Box::pin(tokio_stream::iter(items)))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    fn request() -> ModelRequest {
        ModelRequest {
            provider: "test".into(),
            prompt: "hi".into(),
            output_schema: None,
        }
    }

    #[tokio::test]
    async fn test_from_text_chunks() {
        let model = ScriptedModel::from_text("你好世界!", 2);
        let stream = model.stream(request()).await.unwrap();
        let chunks: Vec<_> = stream.collect::<Vec<_>>().await;
        let texts: Vec<ModelChunk> = chunks.into_iter().map(|c| c.unwrap()).collect();
        assert_eq!(
            texts,
            vec![
                ModelChunk::Content("你好".into()),
                ModelChunk::Content("世界".into()),
                ModelChunk::Content("!".into()),
            ]
        );
        assert_eq!(model.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fail_after() {
        let model = ScriptedModel::from_text("abcd", 1).fail_after(2, "boom");
        let items: Vec<_> = model.stream(request()).await.unwrap().collect().await;
        assert_eq!(items.len(), 3);
        assert!(items[2].is_err());
    }

    #[tokio::test]
    async fn test_failing_call() {
        let model = ScriptedModel::failing("down");
        assert!(matches!(
            model.stream(request()).await,
            Err(StoryError::Model(_))
        ));
    }
}
