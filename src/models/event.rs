//! Live-room events that drive prompt construction instead of free text.
//!
//! Wire shape: `{"type": "<kind>", "data": {...}}` with camelCase data fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::StoryError;

/// Discriminant of [`LiveEvent`], usable without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    UserChat,
    BulletChat,
    GiftEvent,
    ProgramEvent,
    UserInteraction,
    SimpleText,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::UserChat,
        EventKind::BulletChat,
        EventKind::GiftEvent,
        EventKind::ProgramEvent,
        EventKind::UserInteraction,
        EventKind::SimpleText,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::UserChat => "user_chat",
            EventKind::BulletChat => "bullet_chat",
            EventKind::GiftEvent => "gift_event",
            EventKind::ProgramEvent => "program_event",
            EventKind::UserInteraction => "user_interaction",
            EventKind::SimpleText => "simple_text",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == tag)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured live-room notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum LiveEvent {
    UserChat(UserChat),
    BulletChat(BulletChat),
    GiftEvent(GiftEvent),
    ProgramEvent(ProgramEvent),
    UserInteraction(UserInteraction),
    SimpleText(SimpleText),
}

impl LiveEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            LiveEvent::UserChat(_) => EventKind::UserChat,
            LiveEvent::BulletChat(_) => EventKind::BulletChat,
            LiveEvent::GiftEvent(_) => EventKind::GiftEvent,
            LiveEvent::ProgramEvent(_) => EventKind::ProgramEvent,
            LiveEvent::UserInteraction(_) => EventKind::UserInteraction,
            LiveEvent::SimpleText(_) => EventKind::SimpleText,
        }
    }

    /// Parse a tagged payload.
    ///
    /// An unrecognised `type` tag is reported as [`StoryError::UnknownEventKind`];
    /// a known tag with malformed data is a [`StoryError::Validation`].
    pub fn from_json(value: Value) -> Result<Self, StoryError> {
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| StoryError::Validation("Event payload is missing 'type'".into()))?;

        let kind =
            EventKind::from_tag(tag).ok_or_else(|| StoryError::UnknownEventKind(tag.to_string()))?;

        serde_json::from_value(value)
            .map_err(|e| StoryError::Validation(format!("Malformed {} event: {}", kind, e)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserChat {
    pub username: String,
    pub message: String,
}

/// Where a bullet comment (danmaku) is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulletPosition {
    Top,
    Bottom,
    Scroll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletChat {
    pub username: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<BulletPosition>,
}

fn default_gift_count() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftEvent {
    pub username: String,
    pub gift_name: String,
    #[serde(default = "default_gift_count")]
    pub count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramAction {
    Start,
    Finish,
    Pause,
    Resume,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramEvent {
    pub action: ProgramAction,
    pub program_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_type: Option<String>,
    /// Seconds the program ran; rendered only for `finish`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionAction {
    Follow,
    Subscribe,
    Like,
    Share,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInteraction {
    pub username: String,
    pub action: InteractionAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    /// Consecutive months subscribed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleText {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_tags_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_tag(kind.as_str()), Some(kind));
        }
        assert_eq!(EventKind::from_tag("raid"), None);
    }

    #[test]
    fn test_parse_program_event() {
        let event = LiveEvent::from_json(json!({
            "type": "program_event",
            "data": {"action": "finish", "programName": "Karaoke", "duration": 3725}
        }))
        .unwrap();

        assert_eq!(event.kind(), EventKind::ProgramEvent);
        match event {
            LiveEvent::ProgramEvent(p) => {
                assert_eq!(p.action, ProgramAction::Finish);
                assert_eq!(p.program_name, "Karaoke");
                assert_eq!(p.duration, Some(3725));
                assert_eq!(p.program_type, None);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_gift_count_defaults_to_one() {
        let event = LiveEvent::from_json(json!({
            "type": "gift_event",
            "data": {"username": "Carol", "giftName": "Rocket"}
        }))
        .unwrap();
        let LiveEvent::GiftEvent(gift) = event else {
            panic!("expected gift");
        };
        assert_eq!(gift.count, 1);
    }

    #[test]
    fn test_unknown_kind_is_distinct_error() {
        let err = LiveEvent::from_json(json!({"type": "raid", "data": {}})).unwrap_err();
        assert!(matches!(err, StoryError::UnknownEventKind(ref k) if k == "raid"));
    }

    #[test]
    fn test_malformed_known_kind_is_validation() {
        let err = LiveEvent::from_json(json!({
            "type": "user_chat",
            "data": {"username": "Alice"}
        }))
        .unwrap_err();
        assert!(matches!(err, StoryError::Validation(_)));
    }
}
