//! Inputs and outputs of a single turn.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::event::{LiveEvent, UserChat};
use crate::StoryError;

/// Field names probed, in order, when extracting user-facing text.
pub const USER_TEXT_FIELDS: [&str; 4] = ["prompt", "message", "text", "content"];

/// What the caller asked for: free text or a structured live event.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnPayload {
    Text(String),
    Event(LiveEvent),
}

/// The raw request payload plus its parsed form.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnInput {
    raw: Value,
    payload: TurnPayload,
}

impl TurnInput {
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            raw: Value::String(text.clone()),
            payload: TurnPayload::Text(text),
        }
    }

    pub fn event(event: LiveEvent) -> Self {
        Self {
            raw: serde_json::to_value(&event).unwrap_or_default(),
            payload: TurnPayload::Event(event),
        }
    }

    /// Parse an opaque request payload.
    ///
    /// - a JSON string is free text;
    /// - an object with a `type` tag is a live event;
    /// - an untagged object with `username` and `message` is a user chat;
    /// - any other object must carry one of [`USER_TEXT_FIELDS`].
    pub fn from_json(raw: Value) -> Result<Self, StoryError> {
        let payload = match &raw {
            Value::String(s) => TurnPayload::Text(s.clone()),
            Value::Object(map) if map.contains_key("type") => {
                TurnPayload::Event(LiveEvent::from_json(raw.clone())?)
            }
            Value::Object(map) => {
                let username = map.get("username").and_then(Value::as_str);
                let message = map.get("message").and_then(Value::as_str);
                match (username, message) {
                    (Some(username), Some(message)) => TurnPayload::Event(LiveEvent::UserChat(
                        UserChat {
                            username: username.to_string(),
                            message: message.to_string(),
                        },
                    )),
                    _ => TurnPayload::Text(text_field(map).ok_or_else(|| {
                        StoryError::Validation(format!(
                            "Input object has none of the fields: {}",
                            USER_TEXT_FIELDS.join(", ")
                        ))
                    })?),
                }
            }
            other => {
                return Err(StoryError::Validation(format!(
                    "Input must be a string or an object, got: {}",
                    other
                )))
            }
        };
        Ok(Self { raw, payload })
    }

    pub fn payload(&self) -> &TurnPayload {
        &self.payload
    }

    /// The text to persist as the user's side of the turn.
    pub fn user_text(&self) -> String {
        extract_user_text(&self.raw)
    }
}

fn text_field(map: &serde_json::Map<String, Value>) -> Option<String> {
    USER_TEXT_FIELDS
        .iter()
        .filter_map(|field| map.get(*field).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Extract user-facing text from a raw payload.
///
/// Strings are returned as-is. Objects are probed for [`USER_TEXT_FIELDS`],
/// first at the top level and then inside a `data` object. Anything else
/// falls back to its JSON serialization.
pub fn extract_user_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Object(map) => text_field(map)
            .or_else(|| map.get("data").and_then(Value::as_object).and_then(text_field))
            .unwrap_or_else(|| raw.to_string()),
        other => other.to_string(),
    }
}

/// The model request `init` hands to the streaming layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptRequest {
    pub prompt: String,
    /// JSON Schema the response must follow; `None` means free text.
    pub output_schema: Option<Value>,
}

/// Result of `init`: call the model, or answer locally.
#[derive(Debug, Clone, PartialEq)]
pub enum InitOutcome {
    Prompt(PromptRequest),
    /// Pre-built response; the model is not called.
    Bypass { response: String },
}

/// Named event emitted to the streaming transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum TurnEvent {
    Start(String),
    Delta(String),
    Thinking(String),
    Finish(String),
    Error(String),
}

impl TurnEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TurnEvent::Start(_) => "start",
            TurnEvent::Delta(_) => "delta",
            TurnEvent::Thinking(_) => "thinking",
            TurnEvent::Finish(_) => "finish",
            TurnEvent::Error(_) => "error",
        }
    }

    pub fn payload(&self) -> &str {
        match self {
            TurnEvent::Start(p)
            | TurnEvent::Delta(p)
            | TurnEvent::Thinking(p)
            | TurnEvent::Finish(p)
            | TurnEvent::Error(p) => p,
        }
    }
}

/// Server-sent-events framing: one `data:` line per payload line.
impl std::fmt::Display for TurnEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "event: {}", self.name())?;
        let payload = self.payload();
        if payload.is_empty() {
            writeln!(f, "data: ")?;
        }
        for line in payload.lines() {
            writeln!(f, "data: {}", line)?;
        }
        writeln!(f)
    }
}
