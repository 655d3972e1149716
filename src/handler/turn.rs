//! Drives one handler through one turn and emits transport events.

use std::sync::Arc;

use async_stream::stream;
use serde_json::json;
use tokio_stream::{Stream, StreamExt};
use tracing::{error, warn};

use crate::handler::StoryHandler;
use crate::llm::{ChatModel, ModelChunk, ModelRequest};
use crate::models::{InitOutcome, TurnEvent, TurnInput};
use crate::StoryError;

/// Error event payload: the message plus its client/server class.
pub fn error_event(err: &StoryError) -> TurnEvent {
    TurnEvent::Error(
        json!({
            "message": err.to_string(),
            "class": err.class().as_str(),
        })
        .to_string(),
    )
}

/// Run `input` through `handler`, streaming the model's output.
///
/// The handler is consumed, so `on_finish` runs at most once. A model failure
/// ends the stream with one `error` event and nothing is persisted.
pub fn drive_turn(
    mut handler: Box<dyn StoryHandler>,
    input: TurnInput,
    model: Arc<dyn ChatModel>,
) -> impl Stream<Item = TurnEvent> + Send {
    stream! {
        let outcome = match handler.init(input).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Handler init failed: {}", e);
                yield error_event(&e);
                return;
            }
        };

        match outcome {
            InitOutcome::Bypass { response } => {
                yield TurnEvent::Start(handler.context().story_id().to_string());
                yield TurnEvent::Delta(response);
            }
            InitOutcome::Prompt(request) => {
                let request = ModelRequest {
                    provider: handler.context().provider().to_string(),
                    prompt: request.prompt,
                    output_schema: request.output_schema,
                };
                let mut chunks = match model.stream(request).await {
                    Ok(chunks) => chunks,
                    Err(e) => {
                        warn!("Model '{}' failed to start: {}", model.name(), e);
                        yield error_event(&e);
                        return;
                    }
                };

                match handler.on_start() {
                    Ok(event) => yield event,
                    Err(e) => {
                        yield error_event(&e);
                        return;
                    }
                }

                while let Some(chunk) = chunks.next().await {
                    let forwarded = match chunk {
                        Ok(ModelChunk::Content(delta)) => handler.on_content(&delta).map(TurnEvent::Delta),
                        Ok(ModelChunk::Thinking(delta)) => handler.on_thinking(&delta).map(TurnEvent::Thinking),
                        Err(e) => {
                            warn!("Model stream failed mid-turn, nothing persisted: {}", e);
                            Err(e)
                        }
                    };
                    match forwarded {
                        Ok(event) => yield event,
                        Err(e) => {
                            yield error_event(&e);
                            return;
                        }
                    }
                }
            }
        }

        match handler.on_finish().await {
            Ok(outcome) => yield outcome.event,
            Err(e) => {
                error!(
                    "Turn for story {} was not saved: {}",
                    handler.context().story_id(),
                    e
                );
                yield error_event(&e);
            }
        }
    }
}
