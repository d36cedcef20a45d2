//! Skill configuration loading

use super::ConfigError;
use crate::skill::{SkillDefinition, SkillRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Container for skill configurations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsConfig {
    #[serde(rename = "skills")]
    pub skills: Vec<SkillDefinition>,
}

/// Load skill configurations from a TOML file
pub fn load_skill_configs(path: &Path) -> Result<SkillRegistry, ConfigError> {
    let config: SkillsConfig = super::load_toml(path)?;
    build_registry(config)
}

/// Load skill configurations from a TOML string
pub fn parse_skill_configs(content: &str) -> Result<SkillRegistry, ConfigError> {
    let config: SkillsConfig = super::parse_toml(content)?;
    build_registry(config)
}

fn build_registry(config: SkillsConfig) -> Result<SkillRegistry, ConfigError> {
    let mut registry = SkillRegistry::new();
    for skill in config.skills {
        if registry.get(&skill.id).is_some() {
            return Err(ConfigError::ValidationError(format!(
                "duplicate skill id '{}'",
                skill.id
            )));
        }
        registry.register(skill);
    }
    Ok(registry)
}

/// Get default skill configurations
pub fn default_skills() -> SkillRegistry {
    let toml = include_str!("../../config/skills.toml");
    parse_skill_configs(toml).unwrap_or_default()
}
