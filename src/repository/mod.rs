pub mod memory;
pub mod message;

pub use memory::{MemoryRepository, SurrealMemoryRepository};
pub use message::{MessageRepository, SurrealMessageRepository};
