//! Status effects - timed effects, stacking and action restrictions
//!
//! A [`StatusEngine`] owns every active effect instance of one entity. It
//! advances on the fixed simulation tick, and every other component asks it
//! whether an action is allowed, whether hits are forced, how a stat is
//! modified and whether the state machine must be overridden.

mod active;
mod definition;
mod registry;

pub use active::ActiveEffectInstance;
pub use definition::{
    ActionRestrictions, ForcedState, ModifierKind, StackPolicy, StatModifier,
    StatusEffectDefinition,
};
pub use registry::StatusRegistry;

use crate::types::{DamageType, StatId};
use std::sync::Arc;
use tracing::{debug, trace};

/// Result of applying an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A new instance was created
    Created,
    /// The existing instance's timer was reset
    Refreshed,
    /// The existing instance gained a stack (or was already capped) and was refreshed
    Stacked { stacks: u32 },
    /// A parallel instance was started
    Independent,
    /// No definition exists for the requested id; nothing happened
    UnknownEffect,
    /// The target cannot hold effects (dead, or no status engine)
    Rejected,
}

/// Active effect list for one entity
#[derive(Debug, Clone, Default)]
pub struct StatusEngine {
    instances: Vec<ActiveEffectInstance>,
    sequence: u64,
}

impl StatusEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Advance all finite timers, dropping expired instances
    ///
    /// Returns the ids of instances that expired this tick.
    pub fn tick(&mut self, dt: f64) -> Vec<String> {
        let mut expired = Vec::new();
        self.instances.retain_mut(|instance| {
            let alive = instance.tick(dt);
            if !alive {
                expired.push(instance.id().to_string());
            }
            alive
        });
        for id in &expired {
            debug!(effect = %id, "status effect expired");
        }
        expired
    }

    /// Apply a definition according to its stack policy
    pub fn apply(&mut self, definition: &Arc<StatusEffectDefinition>) -> ApplyOutcome {
        let seq = self.next_seq();

        let outcome = match definition.stacking {
            StackPolicy::Independent => {
                self.instances
                    .push(ActiveEffectInstance::new(Arc::clone(definition), seq));
                ApplyOutcome::Independent
            }
            policy => match self.instances.iter_mut().find(|i| i.id() == definition.id) {
                None => {
                    self.instances
                        .push(ActiveEffectInstance::new(Arc::clone(definition), seq));
                    ApplyOutcome::Created
                }
                Some(existing) if policy == StackPolicy::AddStacks => {
                    existing.add_stack(seq);
                    ApplyOutcome::Stacked {
                        stacks: existing.stacks,
                    }
                }
                Some(existing) => {
                    existing.refresh(seq);
                    ApplyOutcome::Refreshed
                }
            },
        };

        debug!(effect = %definition.id, ?outcome, "status effect applied");
        outcome
    }

    /// Look a definition up by id and apply it; unknown ids are a no-op
    pub fn apply_by_id(&mut self, registry: &StatusRegistry, id: &str) -> ApplyOutcome {
        match registry.get(id) {
            Some(definition) => self.apply(definition),
            None => {
                trace!(effect = %id, "ignoring unknown status effect");
                ApplyOutcome::UnknownEffect
            }
        }
    }

    /// Remove every instance of a definition; returns how many were removed
    pub fn remove(&mut self, id: &str) -> usize {
        let before = self.instances.len();
        self.instances.retain(|i| i.id() != id);
        let removed = before - self.instances.len();
        if removed > 0 {
            debug!(effect = %id, removed, "status effect removed");
        }
        removed
    }

    /// Drop every active effect
    pub fn clear_all(&mut self) {
        if !self.instances.is_empty() {
            debug!(count = self.instances.len(), "clearing all status effects");
        }
        self.instances.clear();
    }

    pub fn instances(&self) -> &[ActiveEffectInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn has(&self, id: &str) -> bool {
        self.instances.iter().any(|i| i.id() == id)
    }

    /// Number of instances of a definition (more than one only when Independent)
    pub fn instance_count(&self, id: &str) -> usize {
        self.instances.iter().filter(|i| i.id() == id).count()
    }

    /// Stack count of the first instance of a definition
    pub fn stacks(&self, id: &str) -> Option<u32> {
        self.instances.iter().find(|i| i.id() == id).map(|i| i.stacks)
    }

    pub fn can_move(&self) -> bool {
        !self
            .instances
            .iter()
            .any(|i| i.definition().restrictions.block_move)
    }

    pub fn can_basic_attack(&self) -> bool {
        !self
            .instances
            .iter()
            .any(|i| i.definition().restrictions.block_basic_attack)
    }

    pub fn can_cast_skill(&self) -> bool {
        !self
            .instances
            .iter()
            .any(|i| i.definition().restrictions.block_skill_cast)
    }

    pub fn can_use_damage_type(&self, damage_type: DamageType) -> bool {
        !self
            .instances
            .iter()
            .any(|i| i.definition().blocked_damage_types.contains(&damage_type))
    }

    /// Whether any active effect guarantees hits
    pub fn force_hit(&self) -> bool {
        self.instances.iter().any(|i| i.definition().force_hit)
    }

    /// Apply every modifier for `stat` to `base`
    ///
    /// `floor(max(0, (base + Σadd) × Πmul))`
    pub fn modify_stat(&self, stat: StatId, base: i64) -> i64 {
        let mut additive = 0.0;
        let mut multiplier = 1.0;

        for instance in &self.instances {
            let stacks = instance.stacks.max(1);
            for modifier in instance
                .definition()
                .modifiers
                .iter()
                .filter(|m| m.stat == stat)
            {
                match modifier.kind {
                    ModifierKind::Add => {
                        let scale = if modifier.per_stack { f64::from(stacks) } else { 1.0 };
                        additive += modifier.value * scale;
                    }
                    ModifierKind::Multiply => {
                        let exponent = if modifier.per_stack { stacks as i32 } else { 1 };
                        multiplier *= modifier.value.powi(exponent);
                    }
                }
            }
        }

        let value = ((base as f64) + additive) * multiplier;
        if !value.is_finite() {
            return if value == f64::INFINITY { i64::MAX } else { 0 };
        }
        value.max(0.0).floor() as i64
    }

    /// Forced state override, if any
    ///
    /// Highest `forced_state_priority` wins; ties go to the most recently
    /// applied or refreshed instance.
    pub fn forced_state(&self) -> Option<ForcedState> {
        self.instances
            .iter()
            .filter_map(|i| {
                i.definition()
                    .forced_state
                    .map(|state| (i.definition().forced_state_priority, i.applied_seq, state))
            })
            .max_by_key(|(priority, seq, _)| (*priority, *seq))
            .map(|(_, _, state)| state)
    }
}
