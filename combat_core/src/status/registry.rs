//! StatusRegistry - Lookup of status effect definitions by id

use super::definition::StatusEffectDefinition;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Status effect definition registry
#[derive(Debug, Clone, Default)]
pub struct StatusRegistry {
    definitions: HashMap<String, Arc<StatusEffectDefinition>>,
}

impl StatusRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, replacing any previous one with the same id
    pub fn register(&mut self, mut definition: StatusEffectDefinition) {
        if definition.max_stacks == 0 {
            warn!(id = %definition.id, "max_stacks of 0 clamped to 1");
            definition.max_stacks = 1;
        }
        self.definitions
            .insert(definition.id.clone(), Arc::new(definition));
    }

    /// Get a definition by id
    pub fn get(&self, id: &str) -> Option<&Arc<StatusEffectDefinition>> {
        self.definitions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<StatusEffectDefinition>> {
        self.definitions.values()
    }
}

impl FromIterator<StatusEffectDefinition> for StatusRegistry {
    fn from_iter<I: IntoIterator<Item = StatusEffectDefinition>>(iter: I) -> Self {
        let mut registry = StatusRegistry::new();
        for definition in iter {
            registry.register(definition);
        }
        registry
    }
}
