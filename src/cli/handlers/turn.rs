//! Turn command handlers: prompt, turn, replay.

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_stream::StreamExt;

use crate::cli::output::{
    output_json, output_json_list, print_header, print_hint, print_kv,
    print_section, print_success, OutputMode,
};
use crate::cli::StoryArgs;
use crate::handler::{drive_turn, StoryHandler};
use crate::init::AppContext;
use crate::llm::ScriptedModel;
use crate::models::{
    Clip, ClipEnvelope, HandlerConfig, InitOutcome, StoryContext, TurnEvent, TurnInput,
    TurnPayload,
};

/// Free text, unless the argument parses as a JSON string or object.
pub fn parse_input(raw: &str) -> Result<TurnInput> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Object(_) | Value::String(_))) => Ok(TurnInput::from_json(value)?),
        _ => Ok(TurnInput::text(raw)),
    }
}

fn build_handler(ctx: &AppContext, args: &StoryArgs) -> Result<Box<dyn StoryHandler>> {
    let context = StoryContext::new(&args.story, &args.user, &args.provider)?;
    let config = match &args.config {
        Some(raw) => {
            let value: Value = serde_json::from_str(raw).context("--config is not valid JSON")?;
            Some(HandlerConfig::from_value(value)?)
        }
        None => None,
    };
    let name = args
        .handler
        .as_deref()
        .unwrap_or(&ctx.config.default_handler);
    Ok(ctx.registry.require(name, context, config)?)
}

pub async fn handle_prompt(
    ctx: &AppContext,
    args: &StoryArgs,
    input: &str,
    mode: OutputMode,
) -> Result<()> {
    let input = parse_input(input)?;
    let mut handler = build_handler(ctx, args)?;
    let outcome = handler.init(input).await?;

    match (outcome, mode) {
        (InitOutcome::Prompt(request), OutputMode::Json) => output_json(&request),
        (InitOutcome::Prompt(request), OutputMode::Markdown) => println!("{}", request.prompt),
        (InitOutcome::Prompt(request), OutputMode::Human) => {
            print_section("Prompt", &request.prompt);
            if request.output_schema.is_some() {
                print_hint("\n(structured output: clip envelope)");
            }
        }
        (InitOutcome::Bypass { response }, OutputMode::Json) => {
            output_json(&json!({ "bypass": true, "response": response }))
        }
        (InitOutcome::Bypass { response }, _) => {
            print_section("Bypass (no model call)", &response)
        }
    }
    Ok(())
}

pub async fn handle_turn(
    ctx: &AppContext,
    args: &StoryArgs,
    input: &str,
    response: &str,
    chunk_chars: usize,
    mode: OutputMode,
) -> Result<()> {
    let input = parse_input(input)?;
    let is_live_event = matches!(input.payload(), TurnPayload::Event(_));
    let handler = build_handler(ctx, args)?;
    let model = Arc::new(ScriptedModel::from_text(response, chunk_chars));

    let mut events = Box::pin(drive_turn(handler, input, model));
    let mut collected: Vec<TurnEvent> = Vec::new();
    while let Some(event) = events.next().await {
        if mode != OutputMode::Json {
            print!("{}", event);
        }
        collected.push(event);
    }

    if mode == OutputMode::Json {
        output_json_list(&collected);
    }

    // Non-zero exit on a lost turn
    let reply = streamed_reply(&collected)?;
    if let Ok(envelope) = ClipEnvelope::parse(reply.trim()) {
        if is_live_event {
            ctx.client_state.set_last_live_clips(envelope.clips).await;
        } else {
            ctx.client_state.set_last_speech_clips(envelope.clips).await;
        }
        ctx.client_state.save().await?;
    }

    if mode != OutputMode::Json {
        print_success(&format!("Turn saved to story {}", args.story));
    }
    Ok(())
}

/// Concatenated deltas of a completed turn. A turn that ended in an `error`
/// event, or never finished, is an error.
pub fn streamed_reply(events: &[TurnEvent]) -> Result<String> {
    match events.last() {
        Some(TurnEvent::Finish(_)) => {}
        Some(TurnEvent::Error(payload)) => bail!("Turn failed: {}", payload),
        _ => bail!("Turn ended without a finish event"),
    }
    Ok(events
        .iter()
        .filter_map(|e| match e {
            TurnEvent::Delta(d) => Some(d.as_str()),
            _ => None,
        })
        .collect())
}

fn describe_clip(clip: &Clip) -> String {
    let mut line = clip.spoken().unwrap_or("").to_string();
    let cues: Vec<String> = [("face", &clip.face), ("body", &clip.body)]
        .into_iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}={}", label, v)))
        .collect();
    if !cues.is_empty() {
        line.push_str(&format!("  [{}]", cues.join(", ")));
    }
    line
}

pub async fn handle_replay(ctx: &AppContext, live: bool, mode: OutputMode) -> Result<()> {
    let Some(_guard) = ctx.client_state.try_begin_hotkey() else {
        print_hint("A replay is already running; trigger dropped.");
        return Ok(());
    };

    let snapshot = ctx.client_state.snapshot().await;
    let clips = if live {
        snapshot.last_live_clips
    } else {
        snapshot.last_speech_clips
    };

    if mode == OutputMode::Json {
        output_json_list(&clips);
        return Ok(());
    }

    if clips.is_empty() {
        print_hint("Nothing to replay yet.");
        return Ok(());
    }

    print_header(if live { "Last live reply" } else { "Last reply" });
    for (i, clip) in clips.iter().enumerate() {
        print_kv(&format!("{}", i + 1), &describe_clip(clip));
    }
    Ok(())
}
