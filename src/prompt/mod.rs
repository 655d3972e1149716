//! Prompt assembly: context builders, event builders and the assembler.

pub mod assembler;
pub mod events;
pub mod history;
pub mod memory;
pub mod time;

pub use assembler::PromptParts;
pub use events::{build_event_prompt, build_text_prompt, EventPromptResult};
pub use history::{build_chat_history, render_chat_history, NO_HISTORY_PLACEHOLDER};
pub use memory::{build_memory_context, MemoryContext, MemoryContextOptions};
pub use time::{build_time_context, build_time_context_at};
