//! combat_core - Deterministic combat core for action-RPG entities
//!
//! This library provides:
//! - StatTable: Growth weights, invested points and equipment to base stats
//! - StatusEngine: Timed status effects, stacking, stat modifiers and action restrictions
//! - Entity: HP, life-cycle and skill cooldowns on top of the two
//! - Hit / Damage resolution: Comparison based, no randomness
//! - CombatStateMachine: Intent-driven Idle/Chase/AttackLoop/CastSkill/Stunned/Dead/Respawn
//! - Arena: Fixed-step simulation clock, decision sources and the death bus wired together

pub mod arena;
pub mod brain;
pub mod clock;
pub mod combat;
pub mod config;
pub mod entity;
pub mod library;
pub mod machine;
pub mod prelude;
pub mod skill;
pub mod stat_table;
pub mod status;
pub mod types;

// Re-export core types for convenience
pub use arena::{Arena, FrameReport};
pub use brain::{ArenaView, Brain, Mover, NearestEnemyBrain, PassiveBrain, Steering};
pub use clock::SimulationClock;
pub use combat::{resolve_damage, resolve_hit, AttackReport, HitOutcome};
pub use config::{default_effects, default_skills, CombatConstants, ConfigError};
pub use entity::{DeathBus, DeathEvent, DeathListener, DeathLog, Entity, EntitySpec};
pub use library::CombatLibrary;
pub use machine::{
    CombatIntent, CombatState, CombatStateMachine, MachineConfig, RespawnService, TickContext,
    TickReport,
};
pub use skill::{CasterRequirement, SkillDefinition, SkillRegistry};
pub use stat_table::{GrowthProfile, StatTable};
pub use status::{ApplyOutcome, StatusEffectDefinition, StatusEngine, StatusRegistry};
pub use types::{DamageType, ElementFamily, EntityId, EntityKind, Position, SimTime, SkillId, StatId};
