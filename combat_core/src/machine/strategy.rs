//! Pluggable attack, skill selection and skill execution behavior

use crate::combat::{basic_attack_damage, resolve_hit, skill_damage, AttackReport};
use crate::entity::{DeathEvent, Entity};
use crate::library::CombatLibrary;
use crate::skill::SkillDefinition;
use crate::types::{DamageType, SimTime, SkillId};
use std::sync::Arc;
use tracing::trace;

/// One resolved attack plus the death it caused, if any
#[derive(Debug, Clone, PartialEq)]
pub struct Strike {
    pub report: AttackReport,
    pub death: Option<DeathEvent>,
}

/// Whether `caster` may start casting `skill` at `target` right now
///
/// Every check is a plain "no skill this tick", never an error.
pub fn skill_gate(caster: &Entity, target: Option<&Entity>, skill: Option<&SkillDefinition>) -> bool {
    let (Some(skill), Some(target)) = (skill, target) else {
        return false;
    };
    target.is_targetable()
        && target.id() != caster.id()
        && caster.knows_skill(&skill.id)
        && caster.can_cast_skill()
        && caster.can_use_damage_type(skill.damage_type)
        && skill.usable_by.allows(caster.kind(), caster.level())
        && caster.is_skill_ready(&skill.id)
        && skill.in_range(caster.distance_to(target))
}

/// Performs a basic attack
pub trait AttackStrategy {
    fn basic_attack(&self, attacker: &mut Entity, target: &mut Entity, now: SimTime) -> Strike;
}

/// Chooses which skill, if any, to start casting
pub trait SkillSelector {
    fn select(
        &self,
        caster: &Entity,
        target: &Entity,
        requested: Option<&SkillId>,
        library: &CombatLibrary,
    ) -> Option<Arc<SkillDefinition>>;
}

/// Resolves a skill once its cast completes
pub trait SkillExecutor {
    fn execute(
        &self,
        caster: &mut Entity,
        target: &mut Entity,
        skill: &SkillDefinition,
        library: &CombatLibrary,
        now: SimTime,
    ) -> Strike;
}

/// Physical basic attack: hit check then power minus defense
#[derive(Debug, Clone, Copy, Default)]
pub struct MeleeAttack;

impl AttackStrategy for MeleeAttack {
    fn basic_attack(&self, attacker: &mut Entity, target: &mut Entity, now: SimTime) -> Strike {
        let hit = resolve_hit(attacker, Some(target), DamageType::Physical, false);
        let damage = if hit.is_hit {
            basic_attack_damage(attacker, target)
        } else {
            0
        };
        let death = if hit.is_hit {
            target.take_damage(damage, Some(attacker.id()), now)
        } else {
            None
        };
        trace!(attacker = %attacker.id(), target = %target.id(), hit = hit.is_hit, damage, "basic attack");

        Strike {
            report: AttackReport {
                attacker: attacker.id(),
                target: target.id(),
                skill: None,
                damage_type: DamageType::Physical,
                hit,
                damage,
                killing_blow: death.is_some(),
                effect: None,
            },
            death,
        }
    }
}

/// Casts exactly the requested skill when it passes the gate
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestedSkillSelector;

impl SkillSelector for RequestedSkillSelector {
    fn select(
        &self,
        caster: &Entity,
        target: &Entity,
        requested: Option<&SkillId>,
        library: &CombatLibrary,
    ) -> Option<Arc<SkillDefinition>> {
        let skill = library.skills.get(requested?)?;
        skill_gate(caster, Some(target), Some(skill.as_ref())).then(|| Arc::clone(skill))
    }
}

/// The requested skill if usable, otherwise the first known skill that is
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstReadySkillSelector;

impl SkillSelector for FirstReadySkillSelector {
    fn select(
        &self,
        caster: &Entity,
        target: &Entity,
        requested: Option<&SkillId>,
        library: &CombatLibrary,
    ) -> Option<Arc<SkillDefinition>> {
        RequestedSkillSelector
            .select(caster, target, requested, library)
            .or_else(|| {
                caster
                    .known_skills(&library.skills)
                    .find(|skill| skill_gate(caster, Some(target), Some(skill.as_ref())))
                    .cloned()
            })
    }
}

/// Hit check, damage, on-hit effect, then cooldown
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantDamageExecutor;

impl SkillExecutor for InstantDamageExecutor {
    fn execute(
        &self,
        caster: &mut Entity,
        target: &mut Entity,
        skill: &SkillDefinition,
        library: &CombatLibrary,
        now: SimTime,
    ) -> Strike {
        let hit = resolve_hit(caster, Some(target), skill.damage_type, skill.force_hit);
        let mut damage = 0;
        let mut death = None;
        let mut effect = None;

        if hit.is_hit {
            damage = skill_damage(caster, target, skill);
            death = target.take_damage(damage, Some(caster.id()), now);
            if let Some(effect_id) = &skill.on_hit_effect {
                if target.is_alive() {
                    effect = Some(target.apply_effect(&library.effects, effect_id));
                }
            }
        }
        caster.consume_skill_cooldown(skill);
        trace!(caster = %caster.id(), skill = %skill.id, hit = hit.is_hit, damage, "skill executed");

        Strike {
            report: AttackReport {
                attacker: caster.id(),
                target: target.id(),
                skill: Some(skill.id.clone()),
                damage_type: skill.damage_type,
                hit,
                damage,
                killing_blow: death.is_some(),
                effect,
            },
            death,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConstants;
    use crate::entity::EntitySpec;
    use crate::skill::{CasterRequirement, SkillRegistry};
    use crate::stat_table::GrowthProfile;
    use crate::status::{ApplyOutcome, StatusEffectDefinition, StatusRegistry};
    use crate::types::{ElementFamily, EntityId, EntityKind, Position};

    fn library() -> CombatLibrary {
        let skills: SkillRegistry = [
            SkillDefinition::new("bash", DamageType::Physical, 5)
                .with_timing(0.0, 4.0)
                .with_range(2.0)
                .with_on_hit_effect("daze"),
            SkillDefinition::new("bolt", DamageType::Magic, 10).with_timing(1.0, 3.0),
            SkillDefinition::new("execute", DamageType::TrueDamage, 100)
                .with_requirement(CasterRequirement::MinLevel(50)),
        ]
        .into_iter()
        .collect();
        let effects: StatusRegistry = [
            StatusEffectDefinition::new("daze", 2.0),
            StatusEffectDefinition::new("silence", 2.0)
                .blocking_damage_type(DamageType::Magic),
        ]
        .into_iter()
        .collect();
        CombatLibrary::new(skills, effects, CombatConstants::default())
    }

    fn fighter(id: u32, kind: EntityKind, x: f64) -> Entity {
        let spec = EntitySpec::new(
            format!("f{id}"),
            kind,
            GrowthProfile::new(10)
                .with_weight(ElementFamily::Fire, 3)
                .with_weight(ElementFamily::Earth, 2),
        )
        .with_skill("bash")
        .with_skill("bolt")
        .with_skill("execute");
        Entity::new(EntityId(id), spec, Position::new(x, 0.0), &CombatConstants::default())
    }

    #[test]
    fn test_gate_checks() {
        let lib = library();
        let caster = fighter(1, EntityKind::Player, 0.0);
        let near = fighter(2, EntityKind::Monster, 1.0);
        let far = fighter(3, EntityKind::Monster, 5.0);
        let bash = lib.skills.get(&SkillId::from("bash")).cloned();
        let execute = lib.skills.get(&SkillId::from("execute")).cloned();

        assert!(skill_gate(&caster, Some(&near), bash.as_deref()));
        assert!(!skill_gate(&caster, Some(&far), bash.as_deref()), "out of range");
        assert!(!skill_gate(&caster, None, bash.as_deref()), "no target");
        assert!(!skill_gate(&caster, Some(&near), None), "no skill");
        assert!(!skill_gate(&caster, Some(&near), execute.as_deref()), "level too low");
        assert!(!skill_gate(&caster, Some(&caster), bash.as_deref()), "self target");
    }

    #[test]
    fn test_gate_respects_status_and_cooldown() {
        let lib = library();
        let mut caster = fighter(1, EntityKind::Player, 0.0);
        let target = fighter(2, EntityKind::Monster, 1.0);
        let bolt = lib.skills.get(&SkillId::from("bolt")).unwrap().clone();

        assert!(skill_gate(&caster, Some(&target), Some(bolt.as_ref())));
        caster.apply_effect(&lib.effects, "silence");
        assert!(!skill_gate(&caster, Some(&target), Some(bolt.as_ref())));

        caster.remove_effect("silence");
        caster.consume_skill_cooldown(&bolt);
        assert!(!skill_gate(&caster, Some(&target), Some(bolt.as_ref())));
    }

    #[test]
    fn test_selectors() {
        let lib = library();
        let caster = fighter(1, EntityKind::Player, 0.0);
        let far = fighter(2, EntityKind::Monster, 5.0);

        let requested = SkillId::from("bash");
        assert!(RequestedSkillSelector
            .select(&caster, &far, Some(&requested), &lib)
            .is_none());
        assert!(RequestedSkillSelector.select(&caster, &far, None, &lib).is_none());

        // bash is out of range, bolt has unlimited range
        let picked = FirstReadySkillSelector
            .select(&caster, &far, Some(&requested), &lib)
            .unwrap();
        assert_eq!(picked.id, SkillId::from("bolt"));
    }

    #[test]
    fn test_melee_attack() {
        let mut attacker = fighter(1, EntityKind::Player, 0.0);
        let mut target = fighter(2, EntityKind::Monster, 1.0);
        let strike = MeleeAttack.basic_attack(&mut attacker, &mut target, 0.0);
        assert!(strike.report.hit.is_hit);
        // power 30 vs defense 20
        assert_eq!(strike.report.damage, 10);
        assert_eq!(target.current_hp(), target.max_hp() - 10);
        assert!(strike.report.is_basic_attack());
    }

    #[test]
    fn test_executor_applies_effect_and_cooldown() {
        let lib = library();
        let mut caster = fighter(1, EntityKind::Player, 0.0);
        let mut target = fighter(2, EntityKind::Monster, 1.0);
        let bash = lib.skills.get(&SkillId::from("bash")).unwrap().clone();

        let strike = InstantDamageExecutor.execute(&mut caster, &mut target, &bash, &lib, 1.0);
        // 5 + power 30 - defense 20
        assert_eq!(strike.report.damage, 15);
        assert_eq!(strike.report.effect, Some(ApplyOutcome::Created));
        assert!(target.status().unwrap().has("daze"));
        assert!(!caster.is_skill_ready(&bash.id));
    }

    #[test]
    fn test_executor_killing_blow_skips_effect() {
        let lib = library();
        let mut caster = fighter(1, EntityKind::Player, 0.0);
        let mut target = fighter(2, EntityKind::Monster, 1.0);
        target.take_damage(target.max_hp() - 1, None, 0.0);
        let bash = lib.skills.get(&SkillId::from("bash")).unwrap().clone();

        let strike = InstantDamageExecutor.execute(&mut caster, &mut target, &bash, &lib, 2.0);
        assert!(strike.report.killing_blow);
        assert_eq!(strike.report.effect, None);
        let death = strike.death.unwrap();
        assert_eq!(death.killer, Some(EntityId(1)));
        assert!(!target.status().unwrap().has("daze"));
    }
}
