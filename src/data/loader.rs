//! RON config loader
//!
//! Loads the levelling document from disk, with fallback to built-in defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{LevelError, Result};
use crate::ledger::MaterialAliases;
use crate::progression::{LevelSettings, LevelUpOptions, MaterialConfig, PointTable};

/// Where hosts keep the levelling document by default
pub const DEFAULT_CONFIG_PATH: &str = "assets/data/levelling.ron";

/// The levelling document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevellingConfig {
    /// Points needed per level
    pub division: i64,
    /// Points removed from every score before leveling
    pub subtraction: i64,
    /// Per-material scoring. `None` means no table is configured.
    pub materials: Option<HashMap<String, MaterialConfig>>,
    pub level_up: LevelUpOptions,
    /// Legacy material ids and their canonical replacements
    pub aliases: MaterialAliases,
}

/// Fields missing from a document take these values, so a document
/// without a `materials` section has no point table at all
impl Default for LevellingConfig {
    fn default() -> Self {
        Self {
            division: 1,
            subtraction: 0,
            materials: None,
            level_up: LevelUpOptions::default(),
            aliases: MaterialAliases::new(),
        }
    }
}

impl LevellingConfig {
    /// Add or replace one material's scoring rule
    pub fn with_material(mut self, material: &str, config: MaterialConfig) -> Self {
        self.materials
            .get_or_insert_with(HashMap::new)
            .insert(material.to_string(), config);
        self
    }

    /// Load from a RON file, falling back to defaults if it is missing or broken
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Levelling config {:?} not found, using defaults", path);
            return default_levelling();
        }

        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load levelling config {:?}: {}. Using defaults.", path, e);
                default_levelling()
            }
        }
    }

    /// Load from a RON file, reporting any failure
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_ron_str(&content)?;
        log::info!(
            "Loaded levelling config from {:?} ({} materials)",
            path,
            config.materials.as_ref().map_or(0, HashMap::len)
        );
        Ok(config)
    }

    pub fn from_ron_str(content: &str) -> Result<Self> {
        let config: Self = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| LevelError::Parse(e.to_string()))
    }

    /// Reject values that can only be typos. Zero division is allowed and
    /// treated as 1 by the level formula.
    fn validate(&self) -> Result<()> {
        if let Some(materials) = &self.materials {
            for (material, config) in materials {
                if !config.points.is_finite() {
                    return Err(LevelError::Config(format!(
                        "material {} has a non-finite point value",
                        material
                    )));
                }
            }
        }
        if self.division == 0 {
            log::warn!("Levelling division is 0, treating it as 1");
        }
        Ok(())
    }
}

impl PointTable for LevellingConfig {
    fn is_available(&self) -> bool {
        self.materials.is_some()
    }

    fn material_config(&self, material: &str) -> Option<MaterialConfig> {
        self.materials.as_ref()?.get(material).copied()
    }
}

impl LevelSettings for LevellingConfig {
    fn division(&self) -> i64 {
        self.division
    }

    fn subtraction(&self) -> i64 {
        self.subtraction
    }

    fn level_up_options(&self) -> LevelUpOptions {
        self.level_up.clone()
    }
}

/// Built-in levelling rules
pub fn default_levelling() -> LevellingConfig {
    LevellingConfig {
        division: 100,
        subtraction: 0,
        materials: None,
        level_up: LevelUpOptions::default(),
        aliases: MaterialAliases::legacy_defaults(),
    }
    .with_material("DIAMOND_BLOCK", MaterialConfig::unlimited(150.0))
    .with_material("EMERALD_BLOCK", MaterialConfig::unlimited(150.0))
    .with_material("GOLD_BLOCK", MaterialConfig::unlimited(50.0))
    .with_material("IRON_BLOCK", MaterialConfig::unlimited(20.0))
    .with_material("LAPIS_BLOCK", MaterialConfig::unlimited(10.0))
    .with_material("REDSTONE_BLOCK", MaterialConfig::unlimited(10.0))
    .with_material("BEACON", MaterialConfig::new(500.0, 3))
    .with_material("SPAWNER", MaterialConfig::new(100.0, 10))
    .with_material("HOPPER", MaterialConfig::new(5.0, 40))
    .with_material("REPEATER", MaterialConfig::unlimited(1.0))
    .with_material("ENCHANTING_TABLE", MaterialConfig::new(25.0, 1))
    .with_material("DIRT", MaterialConfig::unlimited(0.0))
    .with_material("STONE", MaterialConfig::unlimited(0.0))
}

/// Export the built-in rules as a RON file for easy editing
pub fn export_default_config(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, default_levelling().to_ron_string()?)?;
    log::info!("Exported default levelling config to {:?}", path);
    Ok(())
}
