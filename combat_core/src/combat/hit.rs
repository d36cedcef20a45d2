//! Hit resolution - comparison based, never a roll
//!
//! - Physical: attacker accuracy >= defender evasion
//! - Magic / Gun: attacker luck >= defender luck
//! - True damage: always hits
//!
//! Ties hit. A forced hit (skill flag or attacker effect) skips the
//! comparison, but nothing lands when either side is dead.

use crate::entity::Entity;
use crate::types::{DamageType, StatId};
use serde::{Deserialize, Serialize};

/// Outcome of a hit check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitOutcome {
    pub is_hit: bool,
    pub was_forced: bool,
}

impl HitOutcome {
    pub const MISS: HitOutcome = HitOutcome {
        is_hit: false,
        was_forced: false,
    };

    fn hit(forced: bool) -> Self {
        HitOutcome {
            is_hit: true,
            was_forced: forced,
        }
    }
}

/// Decide whether an attack lands
pub fn resolve_hit(
    attacker: &Entity,
    defender: Option<&Entity>,
    damage_type: DamageType,
    skill_forces_hit: bool,
) -> HitOutcome {
    let defender = match defender {
        Some(d) if d.is_alive() && attacker.is_alive() => d,
        _ => return HitOutcome::MISS,
    };

    if skill_forces_hit || attacker.force_hit() {
        return HitOutcome::hit(true);
    }

    let lands = match damage_type {
        DamageType::Physical => {
            attacker.final_stat(StatId::Accuracy) >= defender.final_stat(StatId::Evasion)
        }
        DamageType::Magic | DamageType::Gun => {
            attacker.final_stat(StatId::Luck) >= defender.final_stat(StatId::Luck)
        }
        DamageType::TrueDamage => true,
    };

    if lands {
        HitOutcome::hit(false)
    } else {
        HitOutcome::MISS
    }
}
