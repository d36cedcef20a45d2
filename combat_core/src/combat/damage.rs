//! Damage resolution - integer damage, never below 1

use crate::entity::Entity;
use crate::skill::SkillDefinition;
use crate::types::StatId;

/// Basic attack: attacker power minus defender defense
pub fn basic_attack_damage(attacker: &Entity, defender: &Entity) -> i64 {
    (attacker.final_stat(StatId::Power) - defender.final_stat(StatId::Defense)).max(1)
}

/// Skill: base power plus the damage type's offensive stat minus its defensive stat
///
/// True damage deals base power regardless of stats.
pub fn skill_damage(attacker: &Entity, defender: &Entity, skill: &SkillDefinition) -> i64 {
    let raw = match skill.damage_type.stat_pair() {
        Some((offense, defense)) => skill
            .base_power
            .saturating_add(attacker.final_stat(offense))
            .saturating_sub(defender.final_stat(defense)),
        None => skill.base_power,
    };
    raw.max(1)
}

/// Damage for a basic attack (`None`) or a skill
pub fn resolve_damage(attacker: &Entity, defender: &Entity, skill: Option<&SkillDefinition>) -> i64 {
    match skill {
        Some(skill) => skill_damage(attacker, defender, skill),
        None => basic_attack_damage(attacker, defender),
    }
}
