//! AttackReport - Outcome of one basic attack or skill execution

use super::hit::HitOutcome;
use crate::status::ApplyOutcome;
use crate::types::{DamageType, EntityId, SkillId};

/// What happened when an entity attacked
#[derive(Debug, Clone, PartialEq)]
pub struct AttackReport {
    pub attacker: EntityId,
    pub target: EntityId,
    /// `None` for a basic attack
    pub skill: Option<SkillId>,
    pub damage_type: DamageType,
    pub hit: HitOutcome,
    /// Damage applied to the target (zero on a miss)
    pub damage: i64,
    pub killing_blow: bool,
    /// Result of the skill's on-hit effect, if it had one and hit
    pub effect: Option<ApplyOutcome>,
}

impl AttackReport {
    pub fn is_basic_attack(&self) -> bool {
        self.skill.is_none()
    }

    /// One-line description for logs
    pub fn summary(&self) -> String {
        let action = match &self.skill {
            Some(skill) => format!("{} casts {}", self.attacker, skill),
            None => format!("{} attacks", self.attacker),
        };

        if !self.hit.is_hit {
            return format!("{action} on {}: miss", self.target);
        }

        let mut parts = vec![format!("{action} on {}: {} damage", self.target, self.damage)];
        if self.hit.was_forced {
            parts.push("forced hit".to_string());
        }
        if let Some(effect) = self.effect {
            parts.push(format!("effect {effect:?}"));
        }
        if self.killing_blow {
            parts.push("FATAL".to_string());
        }
        parts.join(", ")
    }
}
