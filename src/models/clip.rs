//! Structured assistant output: a sequence of clips for the presentation layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One fragment of an assistant response.
///
/// `speech` is what the avatar says; `body` and `face` drive animation.
/// `text`, `content` and `message` are older spellings of the spoken field
/// still found in stored history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Clip {
    /// What the avatar says out loud.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(skip)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(skip)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(skip)]
    pub message: Option<String>,
    /// Body motion to play while speaking (e.g. "wave", "nod").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Facial expression (e.g. "smile", "surprised").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<String>,
}

impl Clip {
    pub fn speech(text: impl Into<String>) -> Self {
        Self {
            speech: Some(text.into()),
            ..Default::default()
        }
    }

    /// The spoken text of this clip, checking `speech`, `text`, `content`,
    /// `message` in that order. Empty strings are skipped.
    pub fn spoken(&self) -> Option<&str> {
        [&self.speech, &self.text, &self.content, &self.message]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|s| !s.is_empty())
    }
}

/// The JSON envelope stored as an assistant message's content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipEnvelope {
    /// Clips in playback order.
    pub clips: Vec<Clip>,
}

impl ClipEnvelope {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn single(clip: Clip) -> Self {
        Self { clips: vec![clip] }
    }

    /// Every clip's spoken text, concatenated without separators.
    pub fn speech_text(&self) -> String {
        self.clips.iter().filter_map(Clip::spoken).collect()
    }

    /// JSON Schema the model output must satisfy.
    pub fn output_schema() -> Value {
        serde_json::to_value(schemars::schema_for!(ClipEnvelope)).unwrap_or(Value::Null)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{\"clips\":[]}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spoken_priority() {
        let clip = Clip {
            text: Some("text".into()),
            content: Some("content".into()),
            ..Default::default()
        };
        assert_eq!(clip.spoken(), Some("text"));

        let clip = Clip {
            speech: Some(String::new()),
            message: Some("message".into()),
            ..Default::default()
        };
        assert_eq!(clip.spoken(), Some("message"));

        let silent = Clip {
            face: Some("smile".into()),
            ..Default::default()
        };
        assert_eq!(silent.spoken(), None);
    }

    #[test]
    fn test_speech_text_joins_without_separator() {
        let env = ClipEnvelope::parse(
            r#"{"clips":[{"speech":"你好"},{"face":"smile"},{"text":"，欢迎！"}]}"#,
        )
        .unwrap();
        assert_eq!(env.speech_text(), "你好，欢迎！");
    }

    #[test]
    fn test_envelope_requires_clips() {
        assert!(ClipEnvelope::parse(r#"{"speech":"hi"}"#).is_err());
        assert!(ClipEnvelope::parse("not json").is_err());
    }

    #[test]
    fn test_output_schema_mentions_clips() {
        let schema = ClipEnvelope::output_schema();
        let text = schema.to_string();
        assert!(text.contains("clips"));
        assert!(text.contains("speech"));
        assert!(!text.contains("\"message\""));
    }
}
