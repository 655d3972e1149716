//! Stored-data handlers: history, remember.

use anyhow::Result;
use chrono::Utc;

use crate::cli::output::{output_json, output_json_list, print_success, print_table, OutputMode};
use crate::init::AppContext;
use crate::models::{ClipEnvelope, MemoryAction, MemoryCreate, MessageRole};
use crate::utils::sanitize::validate_identifier;
use crate::utils::time::format_time_ago;

/// What a stored message says, with assistant envelopes reduced to speech.
fn display_content(role: MessageRole, content: &str) -> String {
    match role {
        MessageRole::Assistant => ClipEnvelope::parse(content)
            .map(|e| e.speech_text())
            .unwrap_or_else(|_| content.to_string()),
        _ => content.to_string(),
    }
}

pub async fn handle_history(
    ctx: &AppContext,
    story: &str,
    limit: usize,
    mode: OutputMode,
) -> Result<()> {
    validate_identifier("story_id", story)?;
    let messages = ctx.message_repo.get_messages_by_story(story, limit).await?;

    match mode {
        OutputMode::Json => output_json_list(&messages),
        OutputMode::Markdown => {
            for m in &messages {
                println!(
                    "- **{}** ({}): {}",
                    m.role,
                    format_time_ago(m.created_at),
                    display_content(m.role, &m.content)
                );
            }
        }
        OutputMode::Human => {
            let rows: Vec<Vec<String>> = messages
                .iter()
                .map(|m| {
                    vec![
                        m.role.to_string(),
                        format_time_ago(m.created_at),
                        display_content(m.role, &m.content),
                    ]
                })
                .collect();
            print_table(&["Role", "When", "Content"], rows);
        }
    }
    Ok(())
}

pub async fn handle_remember(
    ctx: &AppContext,
    user: &str,
    content: &str,
    category: &str,
    importance: f32,
    provider: &str,
    mode: OutputMode,
) -> Result<()> {
    validate_identifier("user_id", user)?;
    let embedding = ctx.embedding_service.embed_text(provider, content).await?;

    let memory = ctx
        .memory_repo
        .insert_memory(MemoryCreate {
            user_id: user.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            importance: importance.clamp(0.0, 1.0),
            confidence: 1.0,
            action: MemoryAction::Add,
            embedding,
            created_at: Utc::now(),
        })
        .await?;

    if mode == OutputMode::Json {
        output_json(&memory);
    } else {
        print_success(&format!("Remembered for {}: {}", user, memory.content));
    }
    Ok(())
}
