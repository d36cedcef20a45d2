//! Combat resolution - Deterministic hit and damage formulas

mod damage;
mod hit;
mod result;

pub use damage::{basic_attack_damage, resolve_damage, skill_damage};
pub use hit::{resolve_hit, HitOutcome};
pub use result::AttackReport;
