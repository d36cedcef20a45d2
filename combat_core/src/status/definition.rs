//! Status effect definitions (immutable, externally authored)

use crate::types::{DamageType, StatId};
use serde::{Deserialize, Serialize};

/// What happens when an already-active definition is applied again
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackPolicy {
    /// Reset remaining time, keep the stack count
    #[default]
    RefreshDuration,
    /// Add one stack up to the maximum and reset remaining time
    AddStacks,
    /// Start a parallel instance with its own timer
    Independent,
}

/// How a modifier combines with the base stat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    Add,
    Multiply,
}

/// A single stat modifier carried by an effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    pub stat: StatId,
    pub kind: ModifierKind,
    pub value: f64,
    /// Add scales linearly with stacks, Multiply is raised to the stack count
    #[serde(default)]
    pub per_stack: bool,
}

impl StatModifier {
    pub fn add(stat: StatId, value: f64) -> Self {
        StatModifier {
            stat,
            kind: ModifierKind::Add,
            value,
            per_stack: false,
        }
    }

    pub fn multiply(stat: StatId, value: f64) -> Self {
        StatModifier {
            stat,
            kind: ModifierKind::Multiply,
            value,
            per_stack: false,
        }
    }

    pub fn per_stack(mut self) -> Self {
        self.per_stack = true;
        self
    }
}

/// Actions an effect prevents while active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRestrictions {
    #[serde(default)]
    pub block_move: bool,
    #[serde(default)]
    pub block_basic_attack: bool,
    #[serde(default)]
    pub block_skill_cast: bool,
}

/// State the combat state machine is forced into while the effect is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcedState {
    Stunned,
    Idle,
}

/// Immutable definition of a status effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffectDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Seconds; negative means permanent until removed
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default)]
    pub stacking: StackPolicy,
    #[serde(default = "default_max_stacks")]
    pub max_stacks: u32,
    #[serde(default)]
    pub restrictions: ActionRestrictions,
    #[serde(default)]
    pub blocked_damage_types: Vec<DamageType>,
    #[serde(default)]
    pub force_hit: bool,
    #[serde(default)]
    pub modifiers: Vec<StatModifier>,
    #[serde(default)]
    pub forced_state: Option<ForcedState>,
    /// Higher wins when several active effects force a state
    #[serde(default)]
    pub forced_state_priority: i32,
}

fn default_duration() -> f64 {
    -1.0
}

fn default_max_stacks() -> u32 {
    1
}

impl StatusEffectDefinition {
    /// Create a definition with no restrictions or modifiers
    pub fn new(id: impl Into<String>, duration: f64) -> Self {
        let id = id.into();
        StatusEffectDefinition {
            name: id.clone(),
            id,
            duration,
            stacking: StackPolicy::RefreshDuration,
            max_stacks: 1,
            restrictions: ActionRestrictions::default(),
            blocked_damage_types: Vec::new(),
            force_hit: false,
            modifiers: Vec::new(),
            forced_state: None,
            forced_state_priority: 0,
        }
    }

    pub fn with_stacking(mut self, stacking: StackPolicy, max_stacks: u32) -> Self {
        self.stacking = stacking;
        self.max_stacks = max_stacks;
        self
    }

    pub fn with_modifier(mut self, modifier: StatModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_restrictions(mut self, restrictions: ActionRestrictions) -> Self {
        self.restrictions = restrictions;
        self
    }

    pub fn blocking_damage_type(mut self, damage_type: DamageType) -> Self {
        self.blocked_damage_types.push(damage_type);
        self
    }

    pub fn forcing_hit(mut self) -> Self {
        self.force_hit = true;
        self
    }

    pub fn forcing_state(mut self, state: ForcedState, priority: i32) -> Self {
        self.forced_state = Some(state);
        self.forced_state_priority = priority;
        self
    }

    /// Whether the effect never expires on its own
    pub fn is_permanent(&self) -> bool {
        self.duration < 0.0
    }

    /// Maximum stacks, never below one
    pub fn stack_cap(&self) -> u32 {
        self.max_stacks.max(1)
    }

    /// Stun preset: blocks every action and forces the Stunned state
    pub fn stun(id: impl Into<String>, duration: f64) -> Self {
        StatusEffectDefinition::new(id, duration)
            .with_restrictions(ActionRestrictions {
                block_move: true,
                block_basic_attack: true,
                block_skill_cast: true,
            })
            .forcing_state(ForcedState::Stunned, 100)
    }
}
