//! Hot-reloadable levelling config
//!
//! Trackers read through [`SharedLevelling`] on every computation, so a
//! reload takes effect on the next score or level read.

use parking_lot::{RwLock, RwLockReadGuard};
use std::path::{Path, PathBuf};

use super::loader::LevellingConfig;
use crate::error::{LevelError, Result};
use crate::ledger::MaterialLedger;
use crate::progression::{
    compute_points, material_points, LevelFormula, LevelSettings, LevelUpOptions, MaterialConfig, PointTable,
};

#[derive(Debug)]
pub struct SharedLevelling {
    path: Option<PathBuf>,
    config: RwLock<LevellingConfig>,
}

impl SharedLevelling {
    /// Wrap an in-memory config. [`reload`](Self::reload) is unavailable.
    pub fn new(config: LevellingConfig) -> Self {
        Self { path: None, config: RwLock::new(config) }
    }

    /// Load from a file (defaults on failure) and remember the path for reloads
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            path: Some(path.to_path_buf()),
            config: RwLock::new(LevellingConfig::load(path)),
        }
    }

    /// Re-read the backing file. On failure the current config is kept.
    pub fn reload(&self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| LevelError::Config("no config file to reload from".to_string()))?;

        let config = LevellingConfig::try_load(path)?;
        *self.config.write() = config;
        log::info!("Reloaded levelling config from {:?}", path);
        Ok(())
    }

    /// Swap in a new config
    pub fn replace(&self, config: LevellingConfig) {
        *self.config.write() = config;
    }

    /// Read view of the current config. Reloads wait until it is dropped.
    pub fn read(&self) -> RwLockReadGuard<'_, LevellingConfig> {
        self.config.read()
    }

    /// Copy of the current config
    pub fn snapshot(&self) -> LevellingConfig {
        self.config.read().clone()
    }
}

impl PointTable for SharedLevelling {
    fn is_available(&self) -> bool {
        self.config.read().is_available()
    }

    fn material_config(&self, material: &str) -> Option<MaterialConfig> {
        self.config.read().material_config(material)
    }

    // One read guard per computation, so a reload never lands mid-score
    fn score(&self, ledger: &MaterialLedger) -> f64 {
        compute_points(ledger, &*self.config.read())
    }

    fn score_material(&self, ledger: &MaterialLedger, material: &str) -> i64 {
        material_points(ledger, &*self.config.read(), material)
    }
}

impl LevelSettings for SharedLevelling {
    fn division(&self) -> i64 {
        self.config.read().division
    }

    fn subtraction(&self) -> i64 {
        self.config.read().subtraction
    }

    fn formula(&self) -> LevelFormula {
        let config = self.config.read();
        LevelFormula {
            division: config.division,
            subtraction: config.subtraction,
        }
    }

    fn level_up_options(&self) -> LevelUpOptions {
        self.config.read().level_up.clone()
    }
}
