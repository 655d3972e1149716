use thiserror::Error;

/// Error type for story-handler runtime operations.
#[derive(Debug, Error)]
pub enum StoryError {
    /// Input or registration validation failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A structured payload carried an event kind no builder handles.
    #[error("Unknown event kind: '{0}'")]
    UnknownEventKind(String),

    /// A lifecycle call arrived in a state that does not allow it.
    #[error("Invalid transition: cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },

    /// No handler registered under the requested name.
    #[error("Handler not found: '{0}'")]
    HandlerNotFound(String),

    /// Embedding provider failed.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Similarity search failed.
    #[error("Search error: {0}")]
    Search(String),

    /// The language model call or its stream failed.
    #[error("Model error: {0}")]
    Model(String),

    /// Writing the turn's messages failed.
    #[error("Persistence error: {message}")]
    Persistence {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration could not be loaded or applied.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification used by transports to pick a status family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller sent something wrong (4xx-equivalent).
    Client,
    /// The runtime or one of its collaborators failed (5xx-equivalent).
    Server,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Client => "client",
            ErrorClass::Server => "server",
        }
    }
}

impl StoryError {
    pub fn class(&self) -> ErrorClass {
        match self {
            StoryError::Validation(_)
            | StoryError::UnknownEventKind(_)
            | StoryError::HandlerNotFound(_) => ErrorClass::Client,
            StoryError::InvalidTransition { .. }
            | StoryError::Embedding(_)
            | StoryError::Search(_)
            | StoryError::Model(_)
            | StoryError::Persistence { .. }
            | StoryError::Database(_)
            | StoryError::Config(_) => ErrorClass::Server,
        }
    }

    /// Wrap a store failure raised while saving a turn.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoryError::Persistence {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<surrealdb::Error> for StoryError {
    fn from(err: surrealdb::Error) -> Self {
        StoryError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StoryError {
    fn from(err: serde_json::Error) -> Self {
        StoryError::Validation(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for StoryError {
    fn from(err: std::io::Error) -> Self {
        StoryError::Config(format!("I/O error: {}", err))
    }
}
