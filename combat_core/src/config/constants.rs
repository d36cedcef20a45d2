//! Tunable combat constants

use crate::stat_table::StatCurve;
use crate::types::StatId;
use serde::{Deserialize, Serialize};

/// Tunable combat constants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatConstants {
    #[serde(default)]
    pub simulation: SimulationConstants,
    #[serde(default)]
    pub attack: AttackConstants,
    #[serde(default)]
    pub movement: MovementConstants,
    #[serde(default)]
    pub growth: GrowthConstants,
    #[serde(default)]
    pub lifecycle: LifecycleConstants,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConstants {
    /// Fixed simulation rate in Hz (status expiry and cooldowns)
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f64,
    /// Upper bound on simulation steps executed for one frame
    #[serde(default = "default_max_steps_per_frame")]
    pub max_steps_per_frame: u32,
}

impl Default for SimulationConstants {
    fn default() -> Self {
        SimulationConstants {
            tick_rate: default_tick_rate(),
            max_steps_per_frame: default_max_steps_per_frame(),
        }
    }
}

impl SimulationConstants {
    /// Length of one simulation step in seconds
    pub fn step(&self) -> f64 {
        1.0 / self.tick_rate.max(1.0)
    }
}

fn default_tick_rate() -> f64 {
    30.0
}
fn default_max_steps_per_frame() -> u32 {
    8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackConstants {
    /// interval = base / (1 + speed * coefficient)
    #[serde(default = "default_attack_speed_coefficient")]
    pub speed_coefficient: f64,
    /// Attack interval never drops below this many seconds
    #[serde(default = "default_min_attack_interval")]
    pub min_interval: f64,
}

impl Default for AttackConstants {
    fn default() -> Self {
        AttackConstants {
            speed_coefficient: default_attack_speed_coefficient(),
            min_interval: default_min_attack_interval(),
        }
    }
}

fn default_attack_speed_coefficient() -> f64 {
    0.01
}
fn default_min_attack_interval() -> f64 {
    0.2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementConstants {
    /// walk = base * (1 + move_speed * coefficient)
    #[serde(default = "default_move_speed_coefficient")]
    pub speed_coefficient: f64,
}

impl Default for MovementConstants {
    fn default() -> Self {
        MovementConstants {
            speed_coefficient: default_move_speed_coefficient(),
        }
    }
}

fn default_move_speed_coefficient() -> f64 {
    0.01
}

/// One per-stat curve override
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatCurveEntry {
    pub stat: StatId,
    pub curve: StatCurve,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthConstants {
    /// Total points shared by the four family growth weights
    #[serde(default = "default_point_budget")]
    pub point_budget: u32,
    /// Overrides for the built-in level-to-value curves
    #[serde(default)]
    pub curves: Vec<StatCurveEntry>,
}

impl Default for GrowthConstants {
    fn default() -> Self {
        GrowthConstants {
            point_budget: default_point_budget(),
            curves: Vec::new(),
        }
    }
}

impl GrowthConstants {
    /// Curve for a stat, falling back to the built-in default
    pub fn curve(&self, stat: StatId) -> StatCurve {
        self.curves
            .iter()
            .rev()
            .find(|entry| entry.stat == stat)
            .map(|entry| entry.curve)
            .unwrap_or_else(|| StatCurve::default_for(stat))
    }
}

fn default_point_budget() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConstants {
    /// Seconds spent in Dead before respawn or deactivation
    #[serde(default = "default_death_grace_delay")]
    pub death_grace_delay: f64,
}

impl Default for LifecycleConstants {
    fn default() -> Self {
        LifecycleConstants {
            death_grace_delay: default_death_grace_delay(),
        }
    }
}

fn default_death_grace_delay() -> f64 {
    3.0
}
