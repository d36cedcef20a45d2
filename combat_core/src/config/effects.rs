//! Status effect configuration loading

use super::ConfigError;
use crate::status::{StatusEffectDefinition, StatusRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Container for status effect configurations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectsConfig {
    #[serde(rename = "effects")]
    pub effects: Vec<StatusEffectDefinition>,
}

/// Load status effect configurations from a TOML file
pub fn load_effect_configs(path: &Path) -> Result<StatusRegistry, ConfigError> {
    let config: EffectsConfig = super::load_toml(path)?;
    build_registry(config)
}

/// Load status effect configurations from a TOML string
pub fn parse_effect_configs(content: &str) -> Result<StatusRegistry, ConfigError> {
    let config: EffectsConfig = super::parse_toml(content)?;
    build_registry(config)
}

fn build_registry(config: EffectsConfig) -> Result<StatusRegistry, ConfigError> {
    let mut registry = StatusRegistry::new();
    for effect in config.effects {
        if registry.contains(&effect.id) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate effect id '{}'",
                effect.id
            )));
        }
        registry.register(effect);
    }
    Ok(registry)
}

/// Get default status effect configurations
pub fn default_effects() -> StatusRegistry {
    let toml = include_str!("../../config/effects.toml");
    parse_effect_configs(toml).unwrap_or_else(|_| {
        [StatusEffectDefinition::stun("stun", 1.5)]
            .into_iter()
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{ForcedState, StackPolicy};
    use crate::types::DamageType;

    #[test]
    fn test_parse_effects() {
        let toml = r#"
[[effects]]
id = "stun"
duration = 1.5
forced_state = "stunned"
forced_state_priority = 100

[effects.restrictions]
block_move = true
block_basic_attack = true
block_skill_cast = true

[[effects]]
id = "sunder"
duration = 6.0
stacking = "add_stacks"
max_stacks = 3
blocked_damage_types = ["magic"]

[[effects.modifiers]]
stat = "defense"
kind = "add"
value = -4.0
per_stack = true
"#;

        let effects = parse_effect_configs(toml).unwrap();
        assert_eq!(effects.len(), 2);

        let stun = effects.get("stun").unwrap();
        assert_eq!(stun.forced_state, Some(ForcedState::Stunned));
        assert!(stun.restrictions.block_skill_cast);

        let sunder = effects.get("sunder").unwrap();
        assert_eq!(sunder.stacking, StackPolicy::AddStacks);
        assert_eq!(sunder.blocked_damage_types, vec![DamageType::Magic]);
        assert_eq!(sunder.modifiers.len(), 1);
    }

    #[test]
    fn test_duplicate_effect_rejected() {
        let toml = r#"
[[effects]]
id = "haste"

[[effects]]
id = "haste"
"#;
        assert!(matches!(
            parse_effect_configs(toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_default_effects() {
        let effects = default_effects();
        for id in ["stun", "haste", "slow", "sunder", "focus", "calm", "silence"] {
            assert!(effects.contains(id), "missing {id}");
        }
        assert_eq!(
            effects.get("calm").unwrap().forced_state,
            Some(ForcedState::Idle)
        );
    }
}
