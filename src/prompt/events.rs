//! Per-event prompt sections.
//!
//! Each builder is a pure function of its event payload. The dispatcher is an
//! exhaustive `match` over [`LiveEvent`], so a new variant without a builder
//! does not compile.

use serde::Serialize;

use crate::models::{
    BulletChat, BulletPosition, GiftEvent, InteractionAction, LiveEvent, ProgramAction,
    ProgramEvent, SimpleText, UserChat, UserInteraction,
};
use crate::utils::time::format_duration_secs;

/// What an event contributes to the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventPromptResult {
    /// Text fragments, in order.
    pub sections: Vec<String>,
    /// Text to run the memory search with.
    pub search_text: Option<String>,
    /// Whether this event benefits from the user's history at all.
    pub requires_memory: bool,
}

impl EventPromptResult {
    pub fn render(&self) -> String {
        self.sections.join("\n")
    }
}

/// Map an event to its builder.
pub fn build_event_prompt(event: &LiveEvent) -> EventPromptResult {
    match event {
        LiveEvent::UserChat(e) => build_user_chat(e),
        LiveEvent::BulletChat(e) => build_bullet_chat(e),
        LiveEvent::GiftEvent(e) => build_gift_event(e),
        LiveEvent::ProgramEvent(e) => build_program_event(e),
        LiveEvent::UserInteraction(e) => build_user_interaction(e),
        LiveEvent::SimpleText(e) => build_simple_text(e),
    }
}

/// Free-text input, treated like a chat line from the story's user.
pub fn build_text_prompt(text: &str) -> EventPromptResult {
    EventPromptResult {
        sections: vec!["## 用户输入".to_string(), text.to_string()],
        search_text: Some(text.to_string()),
        requires_memory: true,
    }
}

pub fn build_user_chat(event: &UserChat) -> EventPromptResult {
    EventPromptResult {
        sections: vec![
            "## 当前事件：观众聊天".to_string(),
            format!("{}: {}", event.username, event.message),
        ],
        search_text: Some(event.message.clone()),
        requires_memory: true,
    }
}

fn position_label(position: BulletPosition) -> &'static str {
    match position {
        BulletPosition::Top => "顶部",
        BulletPosition::Bottom => "底部",
        BulletPosition::Scroll => "滚动",
    }
}

/// Bullet comments skip memory: reaction speed beats grounding here.
pub fn build_bullet_chat(event: &BulletChat) -> EventPromptResult {
    let line = match event.position {
        Some(position) => format!(
            "{}（{}弹幕）: {}",
            event.username,
            position_label(position),
            event.message
        ),
        None => format!("{}（弹幕）: {}", event.username, event.message),
    };
    EventPromptResult {
        sections: vec![
            "## 当前事件：弹幕".to_string(),
            line,
            "提示：弹幕节奏很快，请用一两句简短俏皮的话回应。".to_string(),
        ],
        search_text: None,
        requires_memory: false,
    }
}

pub fn build_gift_event(event: &GiftEvent) -> EventPromptResult {
    let mut sections = vec![
        "## 当前事件：礼物".to_string(),
        format!(
            "{} 送出了 {} 个{}",
            event.username, event.count, event.gift_name
        ),
    ];
    if let Some(value) = event.value {
        sections.push(format!("礼物价值：{}", value));
    }
    if let Some(message) = &event.message {
        sections.push(format!("附言：{}", message));
    }
    sections.push("提示：请真诚地感谢这位观众的礼物。".to_string());

    EventPromptResult {
        sections,
        // Without an attached message there is nothing to match against, but
        // the caller may still branch on the user's history.
        search_text: event.message.clone().filter(|m| !m.trim().is_empty()),
        requires_memory: true,
    }
}

fn program_verb(action: ProgramAction) -> &'static str {
    match action {
        ProgramAction::Start => "开始",
        ProgramAction::Finish => "结束",
        ProgramAction::Pause => "暂停",
        ProgramAction::Resume => "恢复",
    }
}

fn program_hint(action: ProgramAction) -> &'static str {
    match action {
        ProgramAction::Start => "提示：用充满期待的语气开场，介绍接下来的节目。",
        ProgramAction::Finish => "提示：回顾刚才的节目，感谢大家的陪伴。",
        ProgramAction::Pause => "提示：告诉观众节目暂时中断，请大家稍等片刻。",
        ProgramAction::Resume => "提示：欢迎大家回来，轻松地衔接上之前的内容。",
    }
}

/// Program transitions are broadcasts: no memory, no search text.
pub fn build_program_event(event: &ProgramEvent) -> EventPromptResult {
    let mut sections = vec![
        "## 当前事件：节目".to_string(),
        format!("节目{}：{}", program_verb(event.action), event.program_name),
    ];
    if let Some(program_type) = &event.program_type {
        sections.push(format!("节目类型：{}", program_type));
    }
    if event.action == ProgramAction::Finish {
        if let Some(duration) = event.duration {
            sections.push(format!("持续时长：{}", format_duration_secs(duration)));
        }
    }
    sections.push(program_hint(event.action).to_string());

    EventPromptResult {
        sections,
        search_text: None,
        requires_memory: false,
    }
}

fn interaction_verb(action: InteractionAction) -> &'static str {
    match action {
        InteractionAction::Follow => "关注",
        InteractionAction::Subscribe => "订阅",
        InteractionAction::Like => "点赞",
        InteractionAction::Share => "分享",
    }
}

pub fn build_user_interaction(event: &UserInteraction) -> EventPromptResult {
    let mut sections = vec![
        "## 当前事件：观众互动".to_string(),
        format!("{} {}了直播间", event.username, interaction_verb(event.action)),
    ];

    let hint = if event.action == InteractionAction::Subscribe {
        if let Some(tier) = &event.tier {
            sections.push(format!("订阅档位：{}", tier));
        }
        if let Some(months) = event.months {
            sections.push(format!("连续订阅：{}个月", months));
        }
        match event.months {
            Some(months) if months > 1 => {
                "提示：这是一位长期支持者，请特别感谢对方一直以来的陪伴。"
            }
            _ => "提示：这是一位新的订阅者，请热情地欢迎对方加入。",
        }
    } else {
        "提示：简短而温暖地表示感谢。"
    };
    sections.push(hint.to_string());

    EventPromptResult {
        sections,
        search_text: None,
        requires_memory: true,
    }
}

pub fn build_simple_text(event: &SimpleText) -> EventPromptResult {
    EventPromptResult {
        sections: vec![event.text.clone()],
        search_text: None,
        requires_memory: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_user_chat() {
        let result = build_user_chat(&UserChat {
            username: "Alice".into(),
            message: "hello".into(),
        });
        assert!(result.sections.iter().any(|s| s == "Alice: hello"));
        assert!(result.requires_memory);
        assert_eq!(result.search_text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_bullet_position_label() {
        let result = build_bullet_chat(&BulletChat {
            username: "Bob".into(),
            message: "666".into(),
            position: Some(BulletPosition::Top),
        });
        assert_eq!(result.sections[1], "Bob（顶部弹幕）: 666");
        assert!(!result.requires_memory);
        assert_eq!(result.search_text, None);
    }

    #[test]
    fn test_gift_without_message_still_requires_memory() {
        let result = build_gift_event(&GiftEvent {
            username: "Carol".into(),
            gift_name: "火箭".into(),
            count: 2,
            value: Some(500.0),
            message: None,
        });
        assert_eq!(result.sections[1], "Carol 送出了 2 个火箭");
        assert_eq!(result.sections[2], "礼物价值：500");
        assert!(result.requires_memory);
        assert_eq!(result.search_text, None);
    }

    #[test]
    fn test_gift_with_message_searches_it() {
        let result = build_gift_event(&GiftEvent {
            username: "Carol".into(),
            gift_name: "小心心".into(),
            count: 1,
            value: None,
            message: Some("生日快乐".into()),
        });
        assert!(result.sections.contains(&"附言：生日快乐".to_string()));
        assert_eq!(result.search_text.as_deref(), Some("生日快乐"));
    }

    #[test]
    fn test_program_finish_duration() {
        let result = build_program_event(&ProgramEvent {
            action: ProgramAction::Finish,
            program_name: "Karaoke".into(),
            program_type: None,
            duration: Some(3725),
        });
        assert_eq!(result.sections[1], "节目结束：Karaoke");
        assert!(result.sections.contains(&"持续时长：1小时2分5秒".to_string()));
        assert!(!result.requires_memory);
        assert_eq!(result.search_text, None);
    }

    #[test]
    fn test_program_start_ignores_duration() {
        let result = build_program_event(&ProgramEvent {
            action: ProgramAction::Start,
            program_name: "Karaoke".into(),
            program_type: Some("唱歌".into()),
            duration: Some(60),
        });
        assert!(!result.render().contains("持续时长"));
        assert!(result.render().contains("节目类型：唱歌"));
    }

    #[test]
    fn test_subscriber_tenure_hints_differ() {
        let veteran = build_user_interaction(&UserInteraction {
            username: "Dan".into(),
            action: InteractionAction::Subscribe,
            tier: Some("舰长".into()),
            months: Some(6),
        });
        let newcomer = build_user_interaction(&UserInteraction {
            username: "Eve".into(),
            action: InteractionAction::Subscribe,
            tier: None,
            months: Some(1),
        });
        assert!(veteran.render().contains("订阅档位：舰长"));
        assert!(veteran.render().contains("连续订阅：6个月"));
        assert!(veteran.render().contains("长期支持者"));
        assert!(newcomer.render().contains("新的订阅者"));
        assert!(veteran.requires_memory && veteran.search_text.is_none());
    }

    #[test]
    fn test_follow_has_no_subscription_lines() {
        let result = build_user_interaction(&UserInteraction {
            username: "Fay".into(),
            action: InteractionAction::Follow,
            tier: Some("ignored".into()),
            months: Some(3),
        });
        assert_eq!(result.sections[1], "Fay 关注了直播间");
        assert!(!result.render().contains("订阅"));
    }

    #[test]
    fn test_simple_text_is_minimal() {
        let result = build_simple_text(&SimpleText {
            text: "大家好".into(),
        });
        assert_eq!(result.sections, vec!["大家好".to_string()]);
        assert!(!result.requires_memory);
    }
}
