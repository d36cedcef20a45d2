//! CombatIntent - Per-tick output of a decision source

use crate::types::{EntityId, SkillId};

/// What a decision source wants an entity to do this tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatIntent {
    pub target: Option<EntityId>,
    pub engage: bool,
    pub skill: Option<SkillId>,
}

impl CombatIntent {
    /// Do nothing
    pub fn idle() -> Self {
        Self::default()
    }

    /// Engage a target with basic attacks
    pub fn engage(target: EntityId) -> Self {
        CombatIntent {
            target: Some(target),
            engage: true,
            skill: None,
        }
    }

    /// Also request a skill
    pub fn with_skill(mut self, skill: impl Into<SkillId>) -> Self {
        self.skill = Some(skill.into());
        self
    }
}
