//! Recent-conversation section.
//!
//! Assistant rows hold a [`ClipEnvelope`] as JSON; only the spoken text is
//! echoed back into the prompt. System rows never are.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::{ClipEnvelope, Message, MessageRole, StoryContext};
use crate::repository::MessageRepository;
use crate::utils::time::format_time_ago_at;

pub const HISTORY_HEADER: &str = "## 最近对话";
pub const NO_HISTORY_PLACEHOLDER: &str = "（暂无历史对话）";

/// Fetch and render the last `message_limit` messages of the story.
///
/// A failing store is treated like an empty history.
pub async fn build_chat_history(
    messages: &dyn MessageRepository,
    context: &StoryContext,
    message_limit: usize,
) -> String {
    let rows = match messages
        .get_messages_by_story(context.story_id(), message_limit)
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            warn!(
                "History lookup failed for story {}: {}",
                context.story_id(),
                e
            );
            Vec::new()
        }
    };
    render_chat_history(&rows, Utc::now())
}

/// Render messages (oldest first) as `speaker [relative-time]: content` lines.
pub fn render_chat_history(messages: &[Message], now: DateTime<Utc>) -> String {
    let lines: Vec<String> = messages.iter().filter_map(|m| render_line(m, now)).collect();

    if lines.is_empty() {
        format!("{}\n{}", HISTORY_HEADER, NO_HISTORY_PLACEHOLDER)
    } else {
        format!("{}\n{}", HISTORY_HEADER, lines.join("\n"))
    }
}

fn render_line(message: &Message, now: DateTime<Utc>) -> Option<String> {
    let (speaker, content) = match message.role {
        MessageRole::System => return None,
        MessageRole::User => ("用户", message.content.clone()),
        MessageRole::Assistant => match ClipEnvelope::parse(&message.content) {
            Ok(envelope) => ("助手", envelope.speech_text()),
            Err(e) => {
                warn!("Skipping unparseable assistant message {}: {}", message.id, e);
                return None;
            }
        },
    };

    if content.trim().is_empty() {
        debug!("Skipping empty {} message {}", message.role, message.id);
        return None;
    }

    Some(format!(
        "{} [{}]: {}",
        speaker,
        format_time_ago_at(message.created_at, now),
        content
    ))
}
