//! Core identifiers shared by every combat module

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulation time in seconds
pub type SimTime = f64;

/// Position on the combat plane
pub type Position = glam::DVec2;

/// Stable handle for an entity inside an arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier for a skill definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(pub String);

impl From<&str> for SkillId {
    fn from(s: &str) -> Self {
        SkillId(s.to_string())
    }
}

impl From<String> for SkillId {
    fn from(s: String) -> Self {
        SkillId(s)
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether an entity is controlled by a player or is a monster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Monster,
}

/// Elemental family; each family drives three stats through one growth weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementFamily {
    Fire,
    Earth,
    Wind,
    Water,
}

impl ElementFamily {
    /// Families in declaration order (also the growth-budget clamping order)
    pub fn all() -> &'static [ElementFamily] {
        &[
            ElementFamily::Fire,
            ElementFamily::Earth,
            ElementFamily::Wind,
            ElementFamily::Water,
        ]
    }

    pub fn index(self) -> usize {
        match self {
            ElementFamily::Fire => 0,
            ElementFamily::Earth => 1,
            ElementFamily::Wind => 2,
            ElementFamily::Water => 3,
        }
    }
}

/// The twelve stat identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatId {
    // Fire
    Power,
    MagicPower,
    GunPower,
    // Earth
    Hp,
    Defense,
    MagicDefense,
    // Wind
    Accuracy,
    Evasion,
    Speed,
    // Water
    Luck,
    MoveSpeed,
    Regen,
}

impl StatId {
    pub const COUNT: usize = 12;

    /// Get all stats
    pub fn all() -> &'static [StatId] {
        &[
            StatId::Power,
            StatId::MagicPower,
            StatId::GunPower,
            StatId::Hp,
            StatId::Defense,
            StatId::MagicDefense,
            StatId::Accuracy,
            StatId::Evasion,
            StatId::Speed,
            StatId::Luck,
            StatId::MoveSpeed,
            StatId::Regen,
        ]
    }

    /// Dense index, usable for fixed-size per-stat arrays
    pub fn index(self) -> usize {
        self as usize
    }

    /// The elemental family whose growth weight drives this stat
    pub fn family(self) -> ElementFamily {
        match self {
            StatId::Power | StatId::MagicPower | StatId::GunPower => ElementFamily::Fire,
            StatId::Hp | StatId::Defense | StatId::MagicDefense => ElementFamily::Earth,
            StatId::Accuracy | StatId::Evasion | StatId::Speed => ElementFamily::Wind,
            StatId::Luck | StatId::MoveSpeed | StatId::Regen => ElementFamily::Water,
        }
    }
}

/// Damage type of an attack or skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Physical,
    Magic,
    Gun,
    TrueDamage,
}

impl DamageType {
    /// Offensive and defensive stats used by skill damage, `None` for true damage
    pub fn stat_pair(self) -> Option<(StatId, StatId)> {
        match self {
            DamageType::Physical => Some((StatId::Power, StatId::Defense)),
            DamageType::Magic => Some((StatId::MagicPower, StatId::MagicDefense)),
            DamageType::Gun => Some((StatId::GunPower, StatId::Evasion)),
            DamageType::TrueDamage => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_family_has_three_stats() {
        for family in ElementFamily::all() {
            let count = StatId::all().iter().filter(|s| s.family() == *family).count();
            assert_eq!(count, 3, "{:?}", family);
        }
    }

    #[test]
    fn test_stat_index_is_dense() {
        for (i, stat) in StatId::all().iter().enumerate() {
            assert_eq!(stat.index(), i);
        }
        assert_eq!(StatId::all().len(), StatId::COUNT);
    }

    #[test]
    fn test_damage_type_stat_mapping() {
        assert_eq!(
            DamageType::Gun.stat_pair(),
            Some((StatId::GunPower, StatId::Evasion))
        );
        assert_eq!(DamageType::TrueDamage.stat_pair(), None);
    }

    #[test]
    fn test_stat_id_serialization() {
        let json = serde_json::to_string(&StatId::MagicDefense).unwrap();
        assert_eq!(json, "\"magic_defense\"");
    }
}
