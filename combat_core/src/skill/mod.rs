//! Skill definitions and registry

use crate::types::{DamageType, EntityKind, SkillId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Who may cast a skill
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasterRequirement {
    #[default]
    Anyone,
    PlayersOnly,
    MonstersOnly,
    MinLevel(u32),
}

impl CasterRequirement {
    /// Whether a caster of this kind and level satisfies the requirement
    pub fn allows(self, kind: EntityKind, level: u32) -> bool {
        match self {
            CasterRequirement::Anyone => true,
            CasterRequirement::PlayersOnly => kind == EntityKind::Player,
            CasterRequirement::MonstersOnly => kind == EntityKind::Monster,
            CasterRequirement::MinLevel(min) => level >= min,
        }
    }
}

/// Immutable skill definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub id: SkillId,
    #[serde(default)]
    pub name: String,
    /// Seconds spent casting before the skill resolves
    #[serde(default)]
    pub cast_time: f64,
    /// Seconds before the skill can be used again
    #[serde(default)]
    pub cooldown: f64,
    /// Maximum distance to the target; zero means unlimited
    #[serde(default)]
    pub range: f64,
    pub damage_type: DamageType,
    #[serde(default)]
    pub base_power: i64,
    /// Skill always hits
    #[serde(default)]
    pub force_hit: bool,
    #[serde(default)]
    pub usable_by: CasterRequirement,
    /// Status effect applied to the target on hit
    #[serde(default)]
    pub on_hit_effect: Option<String>,
}

impl SkillDefinition {
    pub fn new(id: impl Into<SkillId>, damage_type: DamageType, base_power: i64) -> Self {
        let id = id.into();
        SkillDefinition {
            name: id.0.clone(),
            id,
            cast_time: 0.0,
            cooldown: 0.0,
            range: 0.0,
            damage_type,
            base_power,
            force_hit: false,
            usable_by: CasterRequirement::Anyone,
            on_hit_effect: None,
        }
    }

    pub fn with_timing(mut self, cast_time: f64, cooldown: f64) -> Self {
        self.cast_time = cast_time;
        self.cooldown = cooldown;
        self
    }

    pub fn with_range(mut self, range: f64) -> Self {
        self.range = range;
        self
    }

    pub fn with_requirement(mut self, requirement: CasterRequirement) -> Self {
        self.usable_by = requirement;
        self
    }

    pub fn with_on_hit_effect(mut self, effect: impl Into<String>) -> Self {
        self.on_hit_effect = Some(effect.into());
        self
    }

    pub fn forcing_hit(mut self) -> Self {
        self.force_hit = true;
        self
    }

    /// Whether a target at `distance` is reachable
    pub fn in_range(&self, distance: f64) -> bool {
        self.range <= 0.0 || distance <= self.range + crate::entity::RANGE_TOLERANCE
    }
}

/// Skill definition registry
#[derive(Debug, Clone, Default)]
pub struct SkillRegistry {
    skills: HashMap<SkillId, Arc<SkillDefinition>>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a skill, clamping negative timings to zero
    pub fn register(&mut self, mut skill: SkillDefinition) {
        if skill.cooldown < 0.0 {
            warn!(skill = %skill.id, cooldown = skill.cooldown, "negative cooldown clamped to 0");
            skill.cooldown = 0.0;
        }
        if skill.cast_time < 0.0 {
            warn!(skill = %skill.id, cast_time = skill.cast_time, "negative cast time clamped to 0");
            skill.cast_time = 0.0;
        }
        self.skills.insert(skill.id.clone(), Arc::new(skill));
    }

    pub fn get(&self, id: &SkillId) -> Option<&Arc<SkillDefinition>> {
        self.skills.get(id)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SkillDefinition>> {
        self.skills.values()
    }
}

impl FromIterator<SkillDefinition> for SkillRegistry {
    fn from_iter<I: IntoIterator<Item = SkillDefinition>>(iter: I) -> Self {
        let mut registry = SkillRegistry::new();
        for skill in iter {
            registry.register(skill);
        }
        registry
    }
}
