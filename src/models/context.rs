//! Per-request story context and per-story handler configuration.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::sanitize::validate_identifier;
use crate::StoryError;

/// Immutable identity of the story a turn belongs to.
///
/// Created once per request and owned by the handler instance serving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryContext {
    story_id: String,
    user_id: String,
    provider: String,
}

impl StoryContext {
    /// Build a validated context.
    pub fn new(
        story_id: impl Into<String>,
        user_id: impl Into<String>,
        provider: impl Into<String>,
    ) -> Result<Self, StoryError> {
        let story_id = story_id.into();
        let user_id = user_id.into();
        let provider = provider.into();
        validate_identifier("story_id", &story_id)?;
        validate_identifier("user_id", &user_id)?;
        if provider.trim().is_empty() {
            return Err(StoryError::Validation("provider must not be empty".into()));
        }
        Ok(Self {
            story_id,
            user_id,
            provider,
        })
    }

    /// Synthetic context used to probe handler factories at registration time.
    pub fn probe() -> Self {
        Self {
            story_id: "__probe_story__".to_string(),
            user_id: "__probe_user__".to_string(),
            provider: "probe".to_string(),
        }
    }

    pub fn story_id(&self) -> &str {
        &self.story_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Model/embedding provider chosen for this story.
    pub fn provider(&self) -> &str {
        &self.provider
    }
}

/// Handler-specific tunables stored per story, passed read-only to factories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerConfig(Map<String, Value>);

impl HandlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a stored config value. `null` means "no overrides".
    pub fn from_value(value: Value) -> Result<Self, StoryError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => Ok(Self(map)),
            other => Err(StoryError::Validation(format!(
                "Handler config must be a JSON object, got: {}",
                other
            ))),
        }
    }

    /// Builder-style insert, mostly for tests and CLI overrides.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deserialize into a handler's typed options. Malformed values are a
    /// validation error so they surface to the caller as a bad request.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, StoryError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| StoryError::Validation(format!("Invalid handler config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_rejects_bad_ids() {
        assert!(StoryContext::new("story-1", "user-1", "openai").is_ok());
        assert!(StoryContext::new("", "user-1", "openai").is_err());
        assert!(StoryContext::new("story-1", "user 1", "openai").is_err());
        assert!(StoryContext::new("story-1", "user-1", "  ").is_err());
    }

    #[test]
    fn test_config_from_null_is_empty() {
        let config = HandlerConfig::from_value(Value::Null).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_config_rejects_non_object() {
        assert!(HandlerConfig::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn test_config_parse_typed() {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Opts {
            memory_top_k: usize,
        }

        let config = HandlerConfig::new().with("memoryTopK", 3);
        let opts: Opts = config.parse().unwrap();
        assert_eq!(opts.memory_top_k, 3);

        let bad = HandlerConfig::new().with("memoryTopK", "three");
        assert!(matches!(
            bad.parse::<Opts>(),
            Err(StoryError::Validation(_))
        ));
    }
}
