//! Per-turn state machine.
//!
//! `Created -> Initialized -> Streaming -> Finished`, forward only. A bypassed
//! turn goes straight from `Initialized` to `Finished`.

use crate::StoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Created,
    Initialized,
    Streaming,
    Finished,
}

impl TurnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnState::Created => "created",
            TurnState::Initialized => "initialized",
            TurnState::Streaming => "streaming",
            TurnState::Finished => "finished",
        }
    }
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default)]
pub struct TurnLifecycle {
    state: TurnState,
    bypassed: bool,
}

impl TurnLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Whether `init` answered locally instead of asking the model.
    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Fail unless the turn is currently in `expected`.
    pub fn require(&self, expected: TurnState, operation: &'static str) -> Result<(), StoryError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    /// `Created -> Initialized`.
    pub fn initialize(&mut self, bypass: bool) -> Result<(), StoryError> {
        self.require(TurnState::Created, "init")?;
        self.state = TurnState::Initialized;
        self.bypassed = bypass;
        Ok(())
    }

    /// `Initialized -> Streaming`. Not allowed after a bypass.
    pub fn start(&mut self) -> Result<(), StoryError> {
        self.require(TurnState::Initialized, "start")?;
        if self.bypassed {
            return Err(self.invalid("start a bypassed turn"));
        }
        self.state = TurnState::Streaming;
        Ok(())
    }

    /// `Streaming -> Finished`, or `Initialized -> Finished` for a bypass.
    pub fn finish(&mut self) -> Result<(), StoryError> {
        let allowed = match self.state {
            TurnState::Streaming => true,
            TurnState::Initialized => self.bypassed,
            TurnState::Created | TurnState::Finished => false,
        };
        if !allowed {
            return Err(self.invalid("finish"));
        }
        self.state = TurnState::Finished;
        Ok(())
    }

    fn invalid(&self, operation: &'static str) -> StoryError {
        StoryError::InvalidTransition {
            operation,
            state: self.state.as_str(),
        }
    }
}
