//! Simulation configuration: RNG seed, play field, spawn table, item drops
//! and logging. Loaded from RON or JSON by file extension.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::logging::TracingConfig;
use crate::monster::Species;
use crate::physics::PlayField;
use crate::rigidbody::rect;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported config extension: {0}")]
    UnsupportedExtension(String),
    #[error("Invalid config: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub left: i32,
    pub right: i32,
    pub floor: i32,
    /// Ground segments as `[left, bottom, right, top]`
    pub segments: Vec<[i32; 4]>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            left: 0,
            right: 2_400_000,
            floor: 0,
            segments: vec![
                [-200_000, -100_000, 2_600_000, 0],
                [300_000, 220_000, 800_000, 250_000],
                [1_600_000, 220_000, 2_100_000, 250_000],
                [950_000, 420_000, 1_450_000, 450_000],
            ],
        }
    }
}

impl FieldConfig {
    pub fn build(&self) -> PlayField {
        let segments = self
            .segments
            .iter()
            .map(|&[l, b, r, t]| rect(l, b, r, t))
            .collect();
        PlayField::new(self.left, self.right, self.floor, segments)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnConfig {
    pub epoch_length_ms: Millis,
    /// Quiet time before the first epoch starts
    pub lead_in_ms: Millis,
    /// Entries in epoch 1
    pub base_count: u32,
    /// Extra entries per later epoch
    pub growth_per_epoch: u32,
    pub max_count: u32,
    pub weights: Vec<(Species, u32)>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            epoch_length_ms: 20_000,
            lead_in_ms: 3_000,
            base_count: 4,
            growth_per_epoch: 2,
            max_count: 24,
            weights: vec![
                (Species::Hopper, 4),
                (Species::Drifter, 3),
                (Species::Walker, 5),
                (Species::Faller, 2),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub field: FieldConfig,
    pub spawn: SpawnConfig,
    /// Chance that a removed monster leaves a skill item
    pub item_drop_chance: f64,
    pub tracing: TracingConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            field: FieldConfig::default(),
            spawn: SpawnConfig::default(),
            item_drop_chance: 0.5,
            tracing: TracingConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Validation(msg));
        if self.field.right <= self.field.left {
            return invalid(format!(
                "field right ({}) must be greater than left ({})",
                self.field.right, self.field.left
            ));
        }
        let spawn = &self.spawn;
        if spawn.epoch_length_ms <= 0 {
            return invalid(format!("epoch length must be positive, got {}", spawn.epoch_length_ms));
        }
        if !(0..spawn.epoch_length_ms).contains(&spawn.lead_in_ms) {
            return invalid(format!(
                "lead-in {} must lie within one epoch ({})",
                spawn.lead_in_ms, spawn.epoch_length_ms
            ));
        }
        if !spawn.weights.iter().any(|(_, weight)| *weight > 0) {
            return invalid("at least one species needs a positive weight".into());
        }
        if !(0.0..=1.0).contains(&self.item_drop_chance) {
            return invalid(format!(
                "item drop chance must be in [0, 1], got {}",
                self.item_drop_chance
            ));
        }
        Ok(())
    }

    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}

/// Load and validate a `.ron` or `.json` config file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimulationConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let config: SimulationConfig = match path.extension().and_then(|ext| ext.to_str()) {
        Some("ron") => ron::from_str(&content)?,
        Some("json") => serde_json::from_str(&content)?,
        other => {
            return Err(ConfigError::UnsupportedExtension(
                other.unwrap_or_default().to_string(),
            ))
        }
    };
    config.validate()?;
    Ok(config)
}
