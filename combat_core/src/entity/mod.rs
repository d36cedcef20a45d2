//! Entity - Stats, status effects, HP and life-cycle for one combatant
//!
//! [`Entity::final_stat`] is the only sanctioned way to read a stat: the base
//! value from the [`StatTable`] passed through the [`StatusEngine`].

mod cooldown;
mod death;

pub use cooldown::SkillCooldowns;
pub use death::{DeathBus, DeathEvent, DeathListener, DeathLog, ListenerId};

use crate::config::CombatConstants;
use crate::skill::{SkillDefinition, SkillRegistry};
use crate::stat_table::{Equipment, GrowthProfile, StatTable};
use crate::status::{ApplyOutcome, ForcedState, StatusEngine};
use crate::types::{DamageType, EntityId, EntityKind, Position, SimTime, SkillId, StatId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Slack applied to every range check
pub const RANGE_TOLERANCE: f64 = 1e-6;

/// Authoring data for an entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySpec {
    pub name: String,
    pub kind: EntityKind,
    #[serde(default)]
    pub growth: GrowthProfile,
    #[serde(default)]
    pub equipment: Equipment,
    /// Units per second before MoveSpeed scaling
    #[serde(default = "default_walk_speed")]
    pub walk_speed: f64,
    #[serde(default = "default_attack_range")]
    pub attack_range: f64,
    /// Seconds between basic attacks before Speed scaling
    #[serde(default = "default_attack_interval")]
    pub attack_interval: f64,
    #[serde(default)]
    pub skills: Vec<SkillId>,
    /// Whether the entity carries a status engine at all
    #[serde(default = "default_status_enabled")]
    pub status_enabled: bool,
}

fn default_walk_speed() -> f64 {
    3.0
}
fn default_attack_range() -> f64 {
    1.5
}
fn default_attack_interval() -> f64 {
    1.0
}
fn default_status_enabled() -> bool {
    true
}

impl EntitySpec {
    pub fn new(name: impl Into<String>, kind: EntityKind, growth: GrowthProfile) -> Self {
        EntitySpec {
            name: name.into(),
            kind,
            growth,
            equipment: Equipment::new(),
            walk_speed: default_walk_speed(),
            attack_range: default_attack_range(),
            attack_interval: default_attack_interval(),
            skills: Vec::new(),
            status_enabled: true,
        }
    }

    pub fn with_skill(mut self, skill: impl Into<SkillId>) -> Self {
        self.skills.push(skill.into());
        self
    }

    pub fn with_attack(mut self, range: f64, interval: f64) -> Self {
        self.attack_range = range;
        self.attack_interval = interval;
        self
    }

    pub fn with_walk_speed(mut self, walk_speed: f64) -> Self {
        self.walk_speed = walk_speed;
        self
    }

    pub fn with_equipment(mut self, equipment: Equipment) -> Self {
        self.equipment = equipment;
        self
    }

    pub fn without_status(mut self) -> Self {
        self.status_enabled = false;
        self
    }
}

/// Tuning copied from [`CombatConstants`] at construction
#[derive(Debug, Clone, Copy)]
struct EntityTuning {
    attack_speed_coefficient: f64,
    min_attack_interval: f64,
    move_speed_coefficient: f64,
}

/// A combat-capable entity
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    pub name: String,
    kind: EntityKind,
    stats: StatTable,
    status: Option<StatusEngine>,
    current_hp: i64,
    max_hp: i64,
    regen_carry: f64,
    position: Position,
    spawn_position: Position,
    base_walk_speed: f64,
    attack_range: f64,
    base_attack_interval: f64,
    skills: Vec<SkillId>,
    cooldowns: SkillCooldowns,
    active: bool,
    death_reported: bool,
    tuning: EntityTuning,
}

impl Entity {
    /// Build an entity at full HP
    pub fn new(id: EntityId, spec: EntitySpec, position: Position, constants: &CombatConstants) -> Self {
        let stats = StatTable::new(spec.growth, &constants.growth).with_equipment(spec.equipment);
        let mut entity = Entity {
            id,
            name: spec.name,
            kind: spec.kind,
            stats,
            status: spec.status_enabled.then(StatusEngine::new),
            current_hp: 0,
            max_hp: 1,
            regen_carry: 0.0,
            position,
            spawn_position: position,
            base_walk_speed: spec.walk_speed.max(0.0),
            attack_range: spec.attack_range.max(0.0),
            base_attack_interval: spec.attack_interval,
            skills: spec.skills,
            cooldowns: SkillCooldowns::new(),
            active: true,
            death_reported: false,
            tuning: EntityTuning {
                attack_speed_coefficient: constants.attack.speed_coefficient,
                min_attack_interval: constants.attack.min_interval.max(0.0),
                move_speed_coefficient: constants.movement.speed_coefficient,
            },
        };
        entity.refresh_max_hp();
        entity.current_hp = entity.max_hp;
        entity
    }

    // === Identity ===

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn level(&self) -> u32 {
        self.stats.level()
    }

    pub fn skills(&self) -> &[SkillId] {
        &self.skills
    }

    pub fn knows_skill(&self, id: &SkillId) -> bool {
        self.skills.contains(id)
    }

    pub fn learn_skill(&mut self, id: SkillId) {
        if !self.knows_skill(&id) {
            self.skills.push(id);
        }
    }

    // === Stats ===

    pub fn stats(&self) -> &StatTable {
        &self.stats
    }

    /// Mutable access to growth and equipment; call [`Entity::refresh_max_hp`] afterwards
    pub fn stats_mut(&mut self) -> &mut StatTable {
        &mut self.stats
    }

    /// Base stat passed through active status modifiers
    pub fn final_stat(&self, stat: StatId) -> i64 {
        let base = self.stats.base_final_stat(stat);
        match &self.status {
            Some(status) => status.modify_stat(stat, base),
            None => base,
        }
    }

    /// Recompute max HP; current HP is clamped down, never raised
    pub fn refresh_max_hp(&mut self) {
        self.max_hp = self.final_stat(StatId::Hp).max(1);
        self.current_hp = self.current_hp.min(self.max_hp);
    }

    /// Seconds between basic attacks
    pub fn attack_interval(&self) -> f64 {
        let speed = self.final_stat(StatId::Speed) as f64;
        let interval =
            self.base_attack_interval / (1.0 + speed * self.tuning.attack_speed_coefficient);
        if interval.is_finite() {
            interval.max(self.tuning.min_attack_interval)
        } else {
            self.tuning.min_attack_interval
        }
    }

    /// Walk speed after MoveSpeed scaling
    pub fn walk_speed(&self) -> f64 {
        let move_speed = self.final_stat(StatId::MoveSpeed) as f64;
        self.base_walk_speed * (1.0 + move_speed * self.tuning.move_speed_coefficient)
    }

    pub fn attack_range(&self) -> f64 {
        self.attack_range
    }

    // === HP and life-cycle ===

    pub fn current_hp(&self) -> i64 {
        self.current_hp
    }

    pub fn max_hp(&self) -> i64 {
        self.max_hp
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    /// Active entities tick and can be targeted
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_targetable(&self) -> bool {
        self.active && self.is_alive()
    }

    /// Permanently remove the entity from combat
    pub fn deactivate(&mut self) {
        if self.active {
            info!(entity = %self.id, name = %self.name, "entity deactivated");
        }
        self.active = false;
    }

    /// Subtract HP; returns the death event if this hit was lethal
    ///
    /// A no-op on dead entities. Exactly one event is produced per life.
    pub fn take_damage(
        &mut self,
        amount: i64,
        source: Option<EntityId>,
        now: SimTime,
    ) -> Option<DeathEvent> {
        if !self.is_alive() {
            return None;
        }
        self.current_hp = (self.current_hp - amount.max(0)).max(0);
        self.check_death(source, now)
    }

    /// Force HP to zero through the same death path as damage
    pub fn kill(&mut self, by: Option<EntityId>, now: SimTime) -> Option<DeathEvent> {
        if !self.is_alive() {
            return None;
        }
        self.current_hp = 0;
        self.check_death(by, now)
    }

    fn check_death(&mut self, killer: Option<EntityId>, now: SimTime) -> Option<DeathEvent> {
        if self.current_hp > 0 || self.death_reported {
            return None;
        }
        self.death_reported = true;
        info!(entity = %self.id, name = %self.name, killer = ?killer, "entity died");
        Some(DeathEvent {
            entity: self.id,
            killer,
            position: self.position,
            time: now,
        })
    }

    /// Restore HP up to max; dead entities cannot be healed
    pub fn heal(&mut self, amount: i64) {
        if self.is_alive() {
            self.current_hp = (self.current_hp + amount.max(0)).min(self.max_hp);
        }
    }

    /// Clean slate: no effects or cooldowns, full HP, back at the spawn point
    pub fn respawn_now(&mut self) {
        if let Some(status) = &mut self.status {
            status.clear_all();
        }
        self.cooldowns.clear();
        self.refresh_max_hp();
        self.current_hp = self.max_hp;
        self.regen_carry = 0.0;
        self.death_reported = false;
        self.position = self.spawn_position;
        info!(entity = %self.id, name = %self.name, hp = self.current_hp, "entity respawned");
    }

    // === Simulation tick ===

    /// Fixed-rate step: status expiry, cooldowns and regeneration
    ///
    /// Returns ids of effects that expired.
    pub fn tick_simulation(&mut self, dt: f64) -> Vec<String> {
        let expired = match &mut self.status {
            Some(status) => status.tick(dt),
            None => Vec::new(),
        };
        self.tick_skill_cooldowns(dt);
        if !expired.is_empty() {
            self.refresh_max_hp();
        }
        self.regenerate(dt);
        expired
    }

    fn regenerate(&mut self, dt: f64) {
        if !self.is_alive() || self.current_hp >= self.max_hp {
            self.regen_carry = 0.0;
            return;
        }
        self.regen_carry += self.final_stat(StatId::Regen) as f64 * dt;
        let whole = self.regen_carry.floor();
        if whole >= 1.0 {
            self.regen_carry -= whole;
            self.heal(whole as i64);
        }
    }

    // === Skills ===

    pub fn is_skill_ready(&self, id: &SkillId) -> bool {
        self.cooldowns.is_ready(id)
    }

    pub fn skill_cooldown(&self, id: &SkillId) -> f64 {
        self.cooldowns.remaining(id)
    }

    pub fn consume_skill_cooldown(&mut self, skill: &SkillDefinition) {
        self.cooldowns.consume(skill);
    }

    pub fn tick_skill_cooldowns(&mut self, dt: f64) {
        self.cooldowns.tick(dt);
    }

    /// Known skills resolved against a registry, in learned order
    pub fn known_skills<'a>(
        &'a self,
        registry: &'a SkillRegistry,
    ) -> impl Iterator<Item = &'a std::sync::Arc<SkillDefinition>> + 'a {
        self.skills.iter().filter_map(move |id| registry.get(id))
    }

    // === Status ===

    pub fn status(&self) -> Option<&StatusEngine> {
        self.status.as_ref()
    }

    pub fn status_mut(&mut self) -> Option<&mut StatusEngine> {
        self.status.as_mut()
    }

    /// Apply an effect by id; dead entities and entities without an engine reject it
    pub fn apply_effect(&mut self, registry: &crate::status::StatusRegistry, id: &str) -> ApplyOutcome {
        if !self.is_alive() {
            return ApplyOutcome::Rejected;
        }
        let outcome = match &mut self.status {
            Some(status) => status.apply_by_id(registry, id),
            None => ApplyOutcome::Rejected,
        };
        if !matches!(outcome, ApplyOutcome::Rejected | ApplyOutcome::UnknownEffect) {
            self.refresh_max_hp();
        }
        outcome
    }

    /// Remove an effect by id; returns how many instances were removed
    pub fn remove_effect(&mut self, id: &str) -> usize {
        let removed = self.status.as_mut().map_or(0, |s| s.remove(id));
        if removed > 0 {
            debug!(entity = %self.id, effect = %id, "effect removed from entity");
            self.refresh_max_hp();
        }
        removed
    }

    pub fn can_move(&self) -> bool {
        self.status.as_ref().map_or(true, StatusEngine::can_move)
    }

    pub fn can_basic_attack(&self) -> bool {
        self.status.as_ref().map_or(true, StatusEngine::can_basic_attack)
    }

    pub fn can_cast_skill(&self) -> bool {
        self.status.as_ref().map_or(true, StatusEngine::can_cast_skill)
    }

    pub fn can_use_damage_type(&self, damage_type: DamageType) -> bool {
        self.status
            .as_ref()
            .map_or(true, |s| s.can_use_damage_type(damage_type))
    }

    pub fn force_hit(&self) -> bool {
        self.status.as_ref().map_or(false, StatusEngine::force_hit)
    }

    pub fn forced_state(&self) -> Option<ForcedState> {
        self.status.as_ref().and_then(StatusEngine::forced_state)
    }

    // === Position ===

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn spawn_position(&self) -> Position {
        self.spawn_position
    }

    pub fn distance_to(&self, other: &Entity) -> f64 {
        self.position.distance(other.position)
    }

    pub fn in_attack_range(&self, other: &Entity) -> bool {
        self.distance_to(other) <= self.attack_range + RANGE_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stat_table::EquipmentPiece;
    use crate::status::{StatModifier, StatusEffectDefinition, StatusRegistry};
    use crate::types::{DamageType, ElementFamily};
    use proptest::prelude::*;

    fn spec() -> EntitySpec {
        EntitySpec::new(
            "knight",
            EntityKind::Player,
            GrowthProfile::new(10)
                .with_weight(ElementFamily::Fire, 3)
                .with_weight(ElementFamily::Earth, 2),
        )
    }

    fn entity() -> Entity {
        Entity::new(EntityId(1), spec(), Position::ZERO, &CombatConstants::default())
    }

    fn registry() -> StatusRegistry {
        [
            StatusEffectDefinition::new("fortify", 5.0)
                .with_modifier(StatModifier::multiply(StatId::Hp, 2.0)),
            StatusEffectDefinition::new("frail", 5.0)
                .with_modifier(StatModifier::multiply(StatId::Hp, 0.5)),
            StatusEffectDefinition::new("might", 5.0)
                .with_modifier(StatModifier::add(StatId::Power, 5.0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_spawns_at_full_hp() {
        let e = entity();
        // earth 2 * level 10 = 20, hp multiplies by 30
        assert_eq!(e.max_hp(), 600);
        assert_eq!(e.current_hp(), 600);
        assert!(e.is_alive());
    }

    #[test]
    fn test_final_stat_includes_status() {
        let mut e = entity();
        assert_eq!(e.final_stat(StatId::Power), 30);
        e.apply_effect(&registry(), "might");
        assert_eq!(e.final_stat(StatId::Power), 35);
    }

    #[test]
    fn test_final_stat_without_status_engine() {
        let e = Entity::new(
            EntityId(2),
            spec().without_status(),
            Position::ZERO,
            &CombatConstants::default(),
        );
        assert!(e.status().is_none());
        assert_eq!(e.final_stat(StatId::Power), 30);
        assert!(e.can_move());
        assert!(!e.force_hit());
    }

    #[test]
    fn test_refresh_max_hp_never_raises_current() {
        let mut e = entity();
        e.take_damage(100, None, 0.0);
        e.apply_effect(&registry(), "fortify");
        assert_eq!(e.max_hp(), 1200);
        assert_eq!(e.current_hp(), 500);

        e.remove_effect("fortify");
        e.apply_effect(&registry(), "frail");
        assert_eq!(e.max_hp(), 300);
        assert_eq!(e.current_hp(), 300);
    }

    #[test]
    fn test_max_hp_at_least_one() {
        let e = Entity::new(
            EntityId(3),
            EntitySpec::new("wisp", EntityKind::Monster, GrowthProfile::new(1)),
            Position::ZERO,
            &CombatConstants::default(),
        );
        assert_eq!(e.max_hp(), 1);
        assert!(e.is_alive());
    }

    #[test]
    fn test_attack_interval_scaling_and_floor() {
        let constants = CombatConstants::default();
        let mut s = spec().with_attack(1.5, 2.0);
        s.growth = s.growth.with_invested(StatId::Speed, 1200);
        // speed = 1200 / 12 = 100 -> 2.0 / (1 + 100 * 0.01) = 1.0
        let e = Entity::new(EntityId(4), s, Position::ZERO, &constants);
        assert!((e.attack_interval() - 1.0).abs() < 1e-9);

        let fast = Entity::new(
            EntityId(5),
            spec().with_attack(1.5, 0.01),
            Position::ZERO,
            &constants,
        );
        assert!((fast.attack_interval() - constants.attack.min_interval).abs() < 1e-9);
    }

    #[test]
    fn test_death_fires_once() {
        let mut e = entity();
        assert!(e.take_damage(599, Some(EntityId(9)), 1.0).is_none());
        let event = e.take_damage(50, Some(EntityId(9)), 2.0).expect("lethal");
        assert_eq!(event.entity, EntityId(1));
        assert_eq!(event.killer, Some(EntityId(9)));
        assert_eq!(event.time, 2.0);
        assert_eq!(e.current_hp(), 0);

        assert!(e.take_damage(50, None, 2.0).is_none());
        assert!(e.kill(None, 2.0).is_none());
        assert_eq!(e.current_hp(), 0);
    }

    #[test]
    fn test_negative_damage_is_ignored() {
        let mut e = entity();
        e.take_damage(-50, None, 0.0);
        assert_eq!(e.current_hp(), 600);
    }

    #[test]
    fn test_kill_uses_death_path() {
        let mut e = entity();
        let event = e.kill(Some(EntityId(7)), 3.0);
        assert!(event.is_some());
        assert!(!e.is_alive());
    }

    #[test]
    fn test_respawn_resets_everything() {
        let mut e = entity();
        let skill = SkillDefinition::new("bolt", DamageType::Magic, 1).with_timing(0.0, 10.0);
        e.consume_skill_cooldown(&skill);
        e.apply_effect(&registry(), "might");
        e.set_position(Position::new(5.0, 5.0));
        e.kill(None, 0.0);

        assert_eq!(e.apply_effect(&registry(), "might"), ApplyOutcome::Rejected);

        e.respawn_now();
        assert!(e.is_alive());
        assert_eq!(e.current_hp(), e.max_hp());
        assert!(e.status().unwrap().is_empty());
        assert!(e.is_skill_ready(&skill.id));
        assert_eq!(e.position(), Position::ZERO);
        assert!(e.kill(None, 1.0).is_some(), "death guard resets on respawn");
    }

    #[test]
    fn test_tick_simulation_expires_and_refreshes_hp() {
        let mut e = entity();
        e.apply_effect(&registry(), "fortify");
        assert_eq!(e.max_hp(), 1200);
        let expired = e.tick_simulation(5.0);
        assert_eq!(expired, vec!["fortify".to_string()]);
        assert_eq!(e.max_hp(), 600);
    }

    #[test]
    fn test_regeneration() {
        let mut s = spec();
        // regen divides by 60: 120 invested points -> 2 hp/s
        s.growth = s.growth.with_invested(StatId::Regen, 120);
        let mut e = Entity::new(EntityId(6), s, Position::ZERO, &CombatConstants::default());
        e.take_damage(10, None, 0.0);
        for _ in 0..30 {
            e.tick_simulation(1.0 / 30.0);
        }
        assert!(e.current_hp() >= 591 && e.current_hp() <= 592);
        for _ in 0..300 {
            e.tick_simulation(1.0 / 30.0);
        }
        assert_eq!(e.current_hp(), e.max_hp());
    }

    #[test]
    fn test_walk_speed_scaling() {
        let mut s = spec().with_walk_speed(2.0);
        s.growth = s.growth.with_invested(StatId::MoveSpeed, 600);
        // move speed 600 / 12 = 50 -> 2.0 * 1.5 = 3.0
        let e = Entity::new(EntityId(7), s, Position::ZERO, &CombatConstants::default());
        assert!((e.walk_speed() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_equipment_reaches_final_stat() {
        let mut e = entity();
        e.stats_mut()
            .equip(EquipmentPiece::new("chest", "Plate").with_bonus(StatId::Defense, 12));
        assert_eq!(e.final_stat(StatId::Defense), 20 + 12);
    }

    proptest! {
        #[test]
        fn prop_refresh_max_hp_never_increases_current(
            damage in 0i64..700,
            factor in 0.0f64..4.0,
        ) {
            let mut e = entity();
            e.take_damage(damage, None, 0.0);
            let before = e.current_hp();
            let registry: StatusRegistry = [StatusEffectDefinition::new("scale", 5.0)
                .with_modifier(StatModifier::multiply(StatId::Hp, factor))]
            .into_iter()
            .collect();
            if let Some(status) = e.status_mut() {
                status.apply_by_id(&registry, "scale");
            }
            e.refresh_max_hp();
            prop_assert!(e.current_hp() <= before);
            prop_assert!(e.current_hp() <= e.max_hp());
            prop_assert!(e.max_hp() >= 1);
        }
    }
}
