//! Equipment - Source-agnostic flat stat bonuses

use crate::types::StatId;
use serde::{Deserialize, Serialize};

/// A flat bonus to one stat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBonus {
    pub stat: StatId,
    pub value: i32,
}

/// One equipped piece, keyed by slot name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentPiece {
    pub slot: String,
    pub name: String,
    #[serde(default)]
    pub bonuses: Vec<StatBonus>,
}

impl EquipmentPiece {
    pub fn new(slot: impl Into<String>, name: impl Into<String>) -> Self {
        EquipmentPiece {
            slot: slot.into(),
            name: name.into(),
            bonuses: Vec::new(),
        }
    }

    pub fn with_bonus(mut self, stat: StatId, value: i32) -> Self {
        self.bonuses.push(StatBonus { stat, value });
        self
    }
}

/// Everything an entity wears
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(default)]
    pieces: Vec<EquipmentPiece>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equip a piece, returning whatever occupied the slot before
    pub fn equip(&mut self, piece: EquipmentPiece) -> Option<EquipmentPiece> {
        let previous = self.unequip(&piece.slot);
        self.pieces.push(piece);
        previous
    }

    /// Remove the piece in a slot
    pub fn unequip(&mut self, slot: &str) -> Option<EquipmentPiece> {
        let index = self.pieces.iter().position(|p| p.slot == slot)?;
        Some(self.pieces.remove(index))
    }

    pub fn equipped(&self, slot: &str) -> Option<&EquipmentPiece> {
        self.pieces.iter().find(|p| p.slot == slot)
    }

    pub fn pieces(&self) -> &[EquipmentPiece] {
        &self.pieces
    }

    /// Sum of all flat bonuses to a stat
    pub fn flat(&self, stat: StatId) -> i64 {
        self.pieces
            .iter()
            .flat_map(|p| p.bonuses.iter())
            .filter(|b| b.stat == stat)
            .map(|b| i64::from(b.value))
            .sum()
    }
}
