//! CombatLibrary - Static data shared by every entity in a session

use crate::config::{
    self, default_effects, default_skills, load_effect_configs, load_skill_configs, CombatConstants,
    ConfigError,
};
use crate::skill::SkillRegistry;
use crate::status::StatusRegistry;
use std::path::Path;
use tracing::{info, warn};

/// Skills, effects and constants, loaded once before combat starts
#[derive(Debug, Clone, Default)]
pub struct CombatLibrary {
    pub skills: SkillRegistry,
    pub effects: StatusRegistry,
    pub constants: CombatConstants,
}

impl CombatLibrary {
    pub fn new(skills: SkillRegistry, effects: StatusRegistry, constants: CombatConstants) -> Self {
        CombatLibrary {
            skills,
            effects,
            constants,
        }
    }

    /// Bundled skills and effects with default constants
    pub fn defaults() -> Self {
        CombatLibrary::new(default_skills(), default_effects(), CombatConstants::default())
    }

    /// Load `skills.toml`, `effects.toml` and `constants.toml` from a directory
    ///
    /// Missing files fall back to the bundled defaults.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let skills_path = dir.join("skills.toml");
        let skills = if skills_path.exists() {
            load_skill_configs(&skills_path)?
        } else {
            default_skills()
        };

        let effects_path = dir.join("effects.toml");
        let effects = if effects_path.exists() {
            load_effect_configs(&effects_path)?
        } else {
            default_effects()
        };

        let constants_path = dir.join("constants.toml");
        let constants = if constants_path.exists() {
            config::load_constants(&constants_path)?
        } else {
            CombatConstants::default()
        };

        let library = CombatLibrary::new(skills, effects, constants);
        library.warn_dangling_effects();
        info!(
            skills = library.skills.len(),
            effects = library.effects.len(),
            dir = %dir.display(),
            "combat library loaded"
        );
        Ok(library)
    }

    /// Report skills whose on-hit effect is not registered
    pub fn warn_dangling_effects(&self) -> usize {
        let mut dangling = 0;
        for skill in self.skills.iter() {
            if let Some(effect) = &skill.on_hit_effect {
                if !self.effects.contains(effect) {
                    warn!(skill = %skill.id, effect = %effect, "on-hit effect is not defined");
                    dangling += 1;
                }
            }
        }
        dangling
    }
}
