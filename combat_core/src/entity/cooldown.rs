//! Per-skill remaining cooldowns

use crate::skill::SkillDefinition;
use crate::types::SkillId;
use std::collections::HashMap;

/// Remaining cooldown per skill; absent means ready
#[derive(Debug, Clone, Default)]
pub struct SkillCooldowns {
    remaining: HashMap<SkillId, f64>,
}

impl SkillCooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self, id: &SkillId) -> bool {
        self.remaining.get(id).map_or(true, |r| *r <= 0.0)
    }

    /// Seconds until the skill is ready (zero when ready)
    pub fn remaining(&self, id: &SkillId) -> f64 {
        self.remaining.get(id).copied().unwrap_or(0.0).max(0.0)
    }

    /// Start the skill's cooldown
    pub fn consume(&mut self, skill: &SkillDefinition) {
        let cooldown = skill.cooldown.max(0.0);
        if cooldown > 0.0 {
            self.remaining.insert(skill.id.clone(), cooldown);
        } else {
            self.remaining.remove(&skill.id);
        }
    }

    /// Count every cooldown down, dropping the expired ones
    pub fn tick(&mut self, dt: f64) {
        self.remaining.retain(|_, r| {
            *r -= dt;
            *r > 0.0
        });
    }

    pub fn clear(&mut self) {
        self.remaining.clear();
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}
