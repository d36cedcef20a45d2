//! StatCurve - Level-to-value conversion per stat

use crate::types::StatId;
use serde::{Deserialize, Serialize};

/// Converts a total stat level into a stat value
///
/// Division always floors; a zero divisor is treated as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatCurve {
    Divide(u32),
    Multiply(u32),
}

impl StatCurve {
    /// Built-in curve for a stat
    pub fn default_for(stat: StatId) -> StatCurve {
        match stat {
            StatId::Hp => StatCurve::Multiply(30),
            StatId::Speed | StatId::MoveSpeed => StatCurve::Divide(12),
            StatId::Regen => StatCurve::Divide(60),
            _ => StatCurve::Divide(1),
        }
    }

    /// Apply the curve to a total stat level
    pub fn apply(self, level: u64) -> u64 {
        match self {
            StatCurve::Divide(divisor) => level / u64::from(divisor.max(1)),
            StatCurve::Multiply(factor) => level.saturating_mul(u64::from(factor)),
        }
    }
}
