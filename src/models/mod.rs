pub mod clip;
pub mod context;
pub mod event;
pub mod memory;
pub mod message;
pub mod turn;

pub use clip::{Clip, ClipEnvelope};
pub use context::{HandlerConfig, StoryContext};
pub use event::{
    BulletChat, BulletPosition, EventKind, GiftEvent, InteractionAction, LiveEvent, ProgramAction,
    ProgramEvent, SimpleText, UserChat, UserInteraction,
};
pub use memory::{Memory, MemoryAction, MemoryCreate, MemorySearch, ScoredMemory};
pub use message::{Message, MessageCreate, MessageRole};
pub use turn::{
    extract_user_text, InitOutcome, PromptRequest, TurnEvent, TurnInput, TurnPayload,
    USER_TEXT_FIELDS,
};
