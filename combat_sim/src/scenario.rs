//! Scenario files - who fights, where, and for how long

use combat_core::brain::{Brain, NearestEnemyBrain, PassiveBrain};
use combat_core::config::ConfigError;
use combat_core::{CombatLibrary, EntitySpec, Position};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Scenario loading error
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to read scenario file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to load combat config: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Invalid scenario: {0}")]
    ValidationError(String),
}

/// Which entities may come back after dying
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RespawnPolicy {
    #[default]
    None,
    All,
    Players,
    Monsters,
}

/// Decision source for a combatant
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BrainConfig {
    Passive,
    NearestEnemy {
        #[serde(default)]
        aggro_range: f64,
        #[serde(default = "default_true")]
        use_skills: bool,
    },
}

impl Default for BrainConfig {
    fn default() -> Self {
        BrainConfig::NearestEnemy {
            aggro_range: 0.0,
            use_skills: true,
        }
    }
}

impl BrainConfig {
    pub fn build(&self) -> Box<dyn Brain> {
        match self {
            BrainConfig::Passive => Box::new(PassiveBrain),
            BrainConfig::NearestEnemy {
                aggro_range,
                use_skills,
            } => {
                let brain = NearestEnemyBrain::new(*aggro_range);
                if *use_skills {
                    Box::new(brain)
                } else {
                    Box::new(brain.without_skills())
                }
            }
        }
    }
}

/// One group of identical combatants
#[derive(Debug, Clone, Deserialize)]
pub struct CombatantConfig {
    #[serde(default = "default_count")]
    pub count: u32,
    pub position: Position,
    #[serde(default)]
    pub brain: BrainConfig,
    /// Whether this group's machines route Dead to Respawn
    #[serde(default = "default_true")]
    pub respawn: bool,
    /// Effects applied right after spawning
    #[serde(default)]
    pub effects: Vec<String>,
    pub entity: EntitySpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Simulated seconds
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    #[serde(default)]
    pub respawn: RespawnPolicy,
    /// Maximum random offset applied to each spawn position
    #[serde(default)]
    pub spawn_jitter: f64,
    /// Directory with skills.toml / effects.toml / constants.toml, relative to the scenario
    #[serde(default)]
    pub config_dir: Option<PathBuf>,
    pub combatants: Vec<CombatantConfig>,
}

fn default_true() -> bool {
    true
}
fn default_count() -> u32 {
    1
}
fn default_seed() -> u64 {
    42
}
fn default_duration() -> f64 {
    60.0
}
fn default_frame_rate() -> f64 {
    60.0
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(ScenarioError::ValidationError(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(ScenarioError::ValidationError(format!(
                "frame_rate must be positive, got {}",
                self.frame_rate
            )));
        }
        if self.spawn_jitter < 0.0 {
            return Err(ScenarioError::ValidationError(
                "spawn_jitter cannot be negative".to_string(),
            ));
        }
        if self.combatants.iter().all(|c| c.count == 0) {
            return Err(ScenarioError::ValidationError(
                "scenario has no combatants".to_string(),
            ));
        }
        Ok(())
    }

    /// Combat data for this scenario; bundled defaults when no config dir is set
    pub fn library(&self, base_dir: &Path) -> Result<CombatLibrary, ScenarioError> {
        match &self.config_dir {
            Some(dir) => Ok(CombatLibrary::load_from_dir(&base_dir.join(dir))?),
            None => Ok(CombatLibrary::defaults()),
        }
    }

    pub fn total_frames(&self) -> u64 {
        (self.duration * self.frame_rate).ceil() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{EntityKind, SkillId};

    const MINIMAL: &str = r#"
name = "Minimal"

[[combatants]]
position = [0.0, 0.0]

[combatants.entity]
name = "Squire"
kind = "player"
skills = ["shield_bash"]

[combatants.entity.growth]
level = 3
"#;

    #[test]
    fn test_parse_minimal_scenario() {
        let scenario = Scenario::parse(MINIMAL).unwrap();
        assert_eq!(scenario.seed, 42);
        assert_eq!(scenario.respawn, RespawnPolicy::None);
        assert_eq!(scenario.total_frames(), 3600);

        let squire = &scenario.combatants[0];
        assert_eq!(squire.count, 1);
        assert!(squire.respawn);
        assert_eq!(squire.brain, BrainConfig::default());
        assert_eq!(squire.entity.kind, EntityKind::Player);
        assert_eq!(squire.entity.skills, vec![SkillId::from("shield_bash")]);
        assert_eq!(squire.entity.growth.level, 3);
    }

    #[test]
    fn test_parse_brain_variants() {
        let toml = r#"
name = "Brains"
respawn = "monsters"

[[combatants]]
position = [1.0, 2.0]
brain = { type = "passive" }
[combatants.entity]
name = "Dummy"
kind = "monster"

[[combatants]]
position = [0.0, 0.0]
brain = { type = "nearest_enemy", aggro_range = 6.0, use_skills = false }
[combatants.entity]
name = "Guard"
kind = "player"
"#;
        let scenario = Scenario::parse(toml).unwrap();
        assert_eq!(scenario.respawn, RespawnPolicy::Monsters);
        assert_eq!(scenario.combatants[0].brain, BrainConfig::Passive);
        assert_eq!(scenario.combatants[0].position, Position::new(1.0, 2.0));
        assert_eq!(
            scenario.combatants[1].brain,
            BrainConfig::NearestEnemy {
                aggro_range: 6.0,
                use_skills: false
            }
        );
    }

    #[test]
    fn test_validation() {
        let bad = MINIMAL.replace("name = \"Minimal\"", "name = \"Bad\"\nduration = 0.0");
        assert!(matches!(
            Scenario::parse(&bad),
            Err(ScenarioError::ValidationError(_))
        ));

        let empty = "name = \"Empty\"\ncombatants = []";
        assert!(matches!(
            Scenario::parse(empty),
            Err(ScenarioError::ValidationError(_))
        ));
    }

    #[test]
    fn test_bundled_scenario_parses() {
        let scenario = Scenario::parse(include_str!("../scenarios/duel.toml")).unwrap();
        assert!(scenario.combatants.len() >= 2);
    }
}
