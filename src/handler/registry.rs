//! Name-keyed handler registry.
//!
//! Built once at startup, then shared read-only behind an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::handler::{HandlerMetadata, HandlerServices, StoryHandler};
use crate::models::{HandlerConfig, StoryContext};
use crate::utils::sanitize::validate_identifier;
use crate::StoryError;

/// Builds a fresh handler for one turn.
pub type HandlerFactory = Arc<
    dyn Fn(StoryContext, HandlerConfig, HandlerServices) -> Result<Box<dyn StoryHandler>, StoryError>
        + Send
        + Sync,
>;

struct RegistryEntry {
    factory: HandlerFactory,
    metadata: Option<HandlerMetadata>,
}

pub struct HandlerRegistry {
    services: HandlerServices,
    entries: HashMap<String, RegistryEntry>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.list())
            .finish()
    }
}

impl HandlerRegistry {
    pub fn new(services: HandlerServices) -> Self {
        Self {
            services,
            entries: HashMap::new(),
        }
    }

    /// Register a factory under `name`, replacing any previous registration.
    ///
    /// The factory is invoked once with a probe context and an empty config;
    /// if that fails, so does registration.
    pub fn register<F>(
        &mut self,
        name: &str,
        factory: F,
        metadata: Option<HandlerMetadata>,
    ) -> Result<(), StoryError>
    where
        F: Fn(StoryContext, HandlerConfig, HandlerServices) -> Result<Box<dyn StoryHandler>, StoryError>
            + Send
            + Sync
            + 'static,
    {
        validate_identifier("handler name", name)?;

        factory(
            StoryContext::probe(),
            HandlerConfig::new(),
            self.services.clone(),
        )
        .map_err(|e| {
            StoryError::Validation(format!(
                "Handler '{}' failed its registration probe: {}",
                name, e
            ))
        })?;

        let replaced = self
            .entries
            .insert(
                name.to_string(),
                RegistryEntry {
                    factory: Arc::new(factory),
                    metadata,
                },
            )
            .is_some();
        if replaced {
            info!("Re-registered handler '{}'", name);
        } else {
            info!("Registered handler '{}'", name);
        }
        Ok(())
    }

    /// Build a handler for one turn. `Ok(None)` when `name` is unknown.
    pub fn resolve(
        &self,
        name: &str,
        context: StoryContext,
        config: Option<HandlerConfig>,
    ) -> Result<Option<Box<dyn StoryHandler>>, StoryError> {
        let Some(entry) = self.entries.get(name) else {
            return Ok(None);
        };
        let handler = (entry.factory)(context, config.unwrap_or_default(), self.services.clone())?;
        Ok(Some(handler))
    }

    /// Like [`resolve`](Self::resolve), but an unknown name is an error.
    pub fn require(
        &self,
        name: &str,
        context: StoryContext,
        config: Option<HandlerConfig>,
    ) -> Result<Box<dyn StoryHandler>, StoryError> {
        self.resolve(name, context, config)?
            .ok_or_else(|| StoryError::HandlerNotFound(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered metadata, or what a throwaway probe instance reports.
    pub fn describe(&self, name: &str) -> Option<HandlerMetadata> {
        let entry = self.entries.get(name)?;
        if let Some(metadata) = &entry.metadata {
            return Some(metadata.clone());
        }
        match (entry.factory)(
            StoryContext::probe(),
            HandlerConfig::new(),
            self.services.clone(),
        ) {
            Ok(probe) => Some(probe.metadata()),
            Err(e) => {
                warn!("Probe for handler '{}' failed: {}", name, e);
                None
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every registration. Tests only.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
