//! ActiveEffectInstance - One running effect on an entity

use super::definition::StatusEffectDefinition;
use std::sync::Arc;

/// A running instance of a status effect definition
#[derive(Debug, Clone)]
pub struct ActiveEffectInstance {
    definition: Arc<StatusEffectDefinition>,
    /// Seconds left; ignored for permanent effects
    pub remaining: f64,
    pub stacks: u32,
    /// Monotonic sequence of the last apply/refresh, for recency ordering
    pub applied_seq: u64,
}

impl ActiveEffectInstance {
    pub fn new(definition: Arc<StatusEffectDefinition>, applied_seq: u64) -> Self {
        ActiveEffectInstance {
            remaining: definition.duration,
            stacks: 1,
            applied_seq,
            definition,
        }
    }

    pub fn definition(&self) -> &StatusEffectDefinition {
        &self.definition
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn is_permanent(&self) -> bool {
        self.definition.is_permanent()
    }

    /// Advance the timer; returns true while the instance is still active
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.is_permanent() {
            return true;
        }
        self.remaining -= dt;
        self.remaining > 0.0
    }

    /// Reset remaining time to the full duration
    pub fn refresh(&mut self, applied_seq: u64) {
        self.remaining = self.definition.duration;
        self.applied_seq = applied_seq;
    }

    /// Add one stack (bounded) and refresh
    pub fn add_stack(&mut self, applied_seq: u64) {
        self.stacks = (self.stacks + 1).min(self.definition.stack_cap());
        self.refresh(applied_seq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StackPolicy;

    #[test]
    fn test_instance_tick() {
        let mut instance =
            ActiveEffectInstance::new(Arc::new(StatusEffectDefinition::new("burn", 1.0)), 0);
        assert!(instance.tick(0.4));
        assert!((instance.remaining - 0.6).abs() < 1e-9);
        assert!(!instance.tick(0.6));
    }

    #[test]
    fn test_permanent_instance_never_expires() {
        let mut instance =
            ActiveEffectInstance::new(Arc::new(StatusEffectDefinition::new("aura", -1.0)), 0);
        for _ in 0..100 {
            assert!(instance.tick(10.0));
        }
    }

    #[test]
    fn test_add_stack_bounded() {
        let def = StatusEffectDefinition::new("rage", 3.0).with_stacking(StackPolicy::AddStacks, 2);
        let mut instance = ActiveEffectInstance::new(Arc::new(def), 0);
        instance.tick(2.0);
        instance.add_stack(1);
        instance.add_stack(2);
        assert_eq!(instance.stacks, 2);
        assert!((instance.remaining - 3.0).abs() < 1e-9);
        assert_eq!(instance.applied_seq, 2);
    }
}
