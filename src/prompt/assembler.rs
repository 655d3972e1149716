//! Joins context sections into the final prompt.

/// The four prompt contributions, in their fixed order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptParts {
    pub time: String,
    pub history: String,
    pub memory: String,
    pub event: String,
}

impl PromptParts {
    /// Time, history, memory, event; empty parts are dropped and the rest
    /// separated by a blank line.
    pub fn assemble(&self) -> String {
        [&self.time, &self.history, &self.memory, &self.event]
            .into_iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
