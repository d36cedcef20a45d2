//! Prelude module for convenient imports
//!
//! ```rust
//! use combat_core::prelude::*;
//! ```

// Core types
pub use crate::types::{DamageType, ElementFamily, EntityId, EntityKind, Position, SkillId, StatId};

// Stats and status
pub use crate::stat_table::{Equipment, EquipmentPiece, GrowthProfile, StatTable};
pub use crate::status::{
    ApplyOutcome, ForcedState, StackPolicy, StatModifier, StatusEffectDefinition, StatusEngine,
    StatusRegistry,
};

// Entities and skills
pub use crate::entity::{DeathEvent, DeathLog, Entity, EntitySpec};
pub use crate::skill::{CasterRequirement, SkillDefinition, SkillRegistry};

// Combat
pub use crate::combat::{resolve_damage, resolve_hit, AttackReport, HitOutcome};
pub use crate::machine::{
    AlwaysRespawn, CombatIntent, CombatState, CombatStateMachine, MachineConfig,
    StraightLineMovement, TickContext,
};

// Composition
pub use crate::arena::Arena;
pub use crate::brain::{Brain, NearestEnemyBrain, PassiveBrain};
pub use crate::library::CombatLibrary;

// Config
pub use crate::config::{default_effects, default_skills, CombatConstants};
