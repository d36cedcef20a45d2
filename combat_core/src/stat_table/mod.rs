//! StatTable - Growth curve, invested points and equipment to base stat values
//!
//! For a stat `s` in family `f`:
//!
//! ```text
//! total_level(s)  = weight(f) * level + invested(s)
//! base_final(s)   = max(0, curve(s)(total_level(s)) + equipment_flat(s))
//! ```
//!
//! Everything here is a pure function of the configured profile. Status
//! effects are layered on top by [`crate::status::StatusEngine`].

mod curve;
mod equipment;

pub use curve::StatCurve;
pub use equipment::{Equipment, EquipmentPiece, StatBonus};

use crate::config::GrowthConstants;
use crate::types::{ElementFamily, StatId};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Per-family growth weights sharing a fixed point budget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthWeights {
    #[serde(default)]
    pub fire: u32,
    #[serde(default)]
    pub earth: u32,
    #[serde(default)]
    pub wind: u32,
    #[serde(default)]
    pub water: u32,
}

impl GrowthWeights {
    pub fn get(&self, family: ElementFamily) -> u32 {
        match family {
            ElementFamily::Fire => self.fire,
            ElementFamily::Earth => self.earth,
            ElementFamily::Wind => self.wind,
            ElementFamily::Water => self.water,
        }
    }

    pub fn set(&mut self, family: ElementFamily, value: u32) {
        match family {
            ElementFamily::Fire => self.fire = value,
            ElementFamily::Earth => self.earth = value,
            ElementFamily::Wind => self.wind = value,
            ElementFamily::Water => self.water = value,
        }
    }

    pub fn total(&self) -> u32 {
        self.fire
            .saturating_add(self.earth)
            .saturating_add(self.wind)
            .saturating_add(self.water)
    }

    /// Clamp weights family by family so their total fits the budget
    ///
    /// Returns true if anything was reduced.
    pub fn clamp_to_budget(&mut self, budget: u32) -> bool {
        if self.total() <= budget {
            return false;
        }
        let mut remaining = budget;
        for family in ElementFamily::all() {
            let granted = self.get(*family).min(remaining);
            remaining -= granted;
            self.set(*family, granted);
        }
        true
    }
}

/// Points invested directly into one stat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatPoints {
    pub stat: StatId,
    pub points: u32,
}

/// Level, growth weights and invested points for one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthProfile {
    pub level: u32,
    #[serde(default)]
    pub weights: GrowthWeights,
    #[serde(default)]
    pub invested: Vec<StatPoints>,
}

impl Default for GrowthProfile {
    fn default() -> Self {
        GrowthProfile::new(1)
    }
}

impl GrowthProfile {
    pub fn new(level: u32) -> Self {
        GrowthProfile {
            level,
            weights: GrowthWeights::default(),
            invested: Vec::new(),
        }
    }

    pub fn with_weight(mut self, family: ElementFamily, weight: u32) -> Self {
        self.weights.set(family, weight);
        self
    }

    pub fn with_invested(mut self, stat: StatId, points: u32) -> Self {
        self.invest(stat, points);
        self
    }

    /// Add invested points to a stat
    pub fn invest(&mut self, stat: StatId, points: u32) {
        match self.invested.iter_mut().find(|p| p.stat == stat) {
            Some(entry) => entry.points = entry.points.saturating_add(points),
            None => self.invested.push(StatPoints { stat, points }),
        }
    }

    /// Points invested into a stat
    pub fn invested(&self, stat: StatId) -> u32 {
        self.invested
            .iter()
            .filter(|p| p.stat == stat)
            .fold(0u32, |acc, p| acc.saturating_add(p.points))
    }
}

/// Base stat computation for one entity
#[derive(Debug, Clone)]
pub struct StatTable {
    profile: GrowthProfile,
    equipment: Equipment,
    curves: [StatCurve; StatId::COUNT],
}

impl StatTable {
    /// Build a table, clamping growth weights to the configured budget
    pub fn new(mut profile: GrowthProfile, growth: &GrowthConstants) -> Self {
        if profile.weights.clamp_to_budget(growth.point_budget) {
            warn!(
                budget = growth.point_budget,
                weights = ?profile.weights,
                "growth weights exceed point budget, clamped"
            );
        }

        let mut curves = [StatCurve::Divide(1); StatId::COUNT];
        for stat in StatId::all() {
            let curve = growth.curve(*stat);
            if curve == StatCurve::Divide(0) {
                warn!(?stat, "zero stat divisor treated as 1");
            }
            curves[stat.index()] = curve;
        }

        StatTable {
            profile,
            equipment: Equipment::new(),
            curves,
        }
    }

    pub fn with_equipment(mut self, equipment: Equipment) -> Self {
        self.equipment = equipment;
        self
    }

    pub fn profile(&self) -> &GrowthProfile {
        &self.profile
    }

    pub fn level(&self) -> u32 {
        self.profile.level
    }

    pub fn set_level(&mut self, level: u32) {
        self.profile.level = level;
    }

    pub fn invest(&mut self, stat: StatId, points: u32) {
        self.profile.invest(stat, points);
    }

    pub fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    pub fn equip(&mut self, piece: EquipmentPiece) -> Option<EquipmentPiece> {
        self.equipment.equip(piece)
    }

    pub fn unequip(&mut self, slot: &str) -> Option<EquipmentPiece> {
        self.equipment.unequip(slot)
    }

    /// Family growth weight × level + invested points
    pub fn total_stat_level(&self, stat: StatId) -> u64 {
        let weight = u64::from(self.profile.weights.get(stat.family()));
        weight
            .saturating_mul(u64::from(self.profile.level))
            .saturating_add(u64::from(self.profile.invested(stat)))
    }

    /// Apply the stat's curve to a level (floor division)
    pub fn level_to_value(&self, stat: StatId, level: u64) -> u64 {
        self.curves[stat.index()].apply(level)
    }

    /// Flat bonus from equipment
    pub fn equipment_flat(&self, stat: StatId) -> i64 {
        self.equipment.flat(stat)
    }

    /// Curve value plus equipment, never negative
    pub fn base_final_stat(&self, stat: StatId) -> i64 {
        let curve_value = i64::try_from(self.level_to_value(stat, self.total_stat_level(stat)))
            .unwrap_or(i64::MAX);
        curve_value.saturating_add(self.equipment_flat(stat)).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table(profile: GrowthProfile) -> StatTable {
        StatTable::new(profile, &GrowthConstants::default())
    }

    #[test]
    fn test_fire_growth_scenario() {
        let table = table(GrowthProfile::new(10).with_weight(ElementFamily::Fire, 3));
        assert_eq!(table.total_stat_level(StatId::Power), 30);
        assert_eq!(table.base_final_stat(StatId::Power), 30);
    }

    #[test]
    fn test_equipment_flat_added_after_curve() {
        let table = table(GrowthProfile::new(10).with_weight(ElementFamily::Fire, 3)).with_equipment({
            let mut e = Equipment::new();
            e.equip(EquipmentPiece::new("weapon", "Sword").with_bonus(StatId::Power, 7));
            e
        });
        assert_eq!(table.base_final_stat(StatId::Power), 37);
    }

    #[test]
    fn test_invested_points_add_to_level() {
        let table = table(
            GrowthProfile::new(5)
                .with_weight(ElementFamily::Wind, 2)
                .with_invested(StatId::Speed, 14),
        );
        // 2 * 5 + 14 = 24, speed divides by 12
        assert_eq!(table.total_stat_level(StatId::Speed), 24);
        assert_eq!(table.base_final_stat(StatId::Speed), 2);
    }

    #[test]
    fn test_hp_multiplies() {
        let table = table(GrowthProfile::new(4).with_weight(ElementFamily::Earth, 1));
        assert_eq!(table.base_final_stat(StatId::Hp), 120);
    }

    #[test]
    fn test_negative_equipment_clamps_to_zero() {
        let mut table = table(GrowthProfile::new(1).with_weight(ElementFamily::Water, 1));
        table.equip(EquipmentPiece::new("ring", "Cursed Ring").with_bonus(StatId::Luck, -50));
        assert_eq!(table.base_final_stat(StatId::Luck), 0);
    }

    #[test]
    fn test_weights_clamped_to_budget() {
        let table = table(
            GrowthProfile::new(1)
                .with_weight(ElementFamily::Fire, 6)
                .with_weight(ElementFamily::Earth, 6)
                .with_weight(ElementFamily::Wind, 6),
        );
        let weights = table.profile().weights;
        assert_eq!(weights.fire, 6);
        assert_eq!(weights.earth, 4);
        assert_eq!(weights.wind, 0);
        assert_eq!(weights.total(), 10);
    }

    #[test]
    fn test_curve_override() {
        let growth = GrowthConstants {
            point_budget: 10,
            curves: vec![crate::config::StatCurveEntry {
                stat: StatId::Power,
                curve: StatCurve::Multiply(2),
            }],
        };
        let table = StatTable::new(GrowthProfile::new(3).with_weight(ElementFamily::Fire, 1), &growth);
        assert_eq!(table.base_final_stat(StatId::Power), 6);
    }

    fn arb_profile() -> impl Strategy<Value = GrowthProfile> {
        (
            0u32..200,
            0u32..5,
            0u32..5,
            0u32..5,
            0u32..5,
            proptest::collection::vec((0usize..StatId::COUNT, 0u32..500), 0..6),
        )
            .prop_map(|(level, fire, earth, wind, water, invested)| {
                let mut profile = GrowthProfile::new(level)
                    .with_weight(ElementFamily::Fire, fire)
                    .with_weight(ElementFamily::Earth, earth)
                    .with_weight(ElementFamily::Wind, wind)
                    .with_weight(ElementFamily::Water, water);
                for (index, points) in invested {
                    profile.invest(StatId::all()[index], points);
                }
                profile
            })
    }

    proptest! {
        #[test]
        fn prop_base_final_stat_non_negative_and_stable(
            profile in arb_profile(),
            bonus in -1000i32..1000,
        ) {
            let mut a = table(profile.clone());
            a.equip(EquipmentPiece::new("ring", "Ring").with_bonus(StatId::Luck, bonus));
            let mut b = table(profile);
            b.equip(EquipmentPiece::new("ring", "Ring").with_bonus(StatId::Luck, bonus));

            for stat in StatId::all() {
                let value = a.base_final_stat(*stat);
                prop_assert!(value >= 0);
                prop_assert_eq!(value, b.base_final_stat(*stat));
            }
        }
    }
}
