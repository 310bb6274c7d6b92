//! Levelling configuration
//!
//! The point table, level formula parameters and level-up options are
//! loaded from an external RON document so servers can tune them without
//! a rebuild.

pub mod loader;
pub mod shared;

pub use loader::{default_levelling, export_default_config, LevellingConfig, DEFAULT_CONFIG_PATH};
pub use shared::SharedLevelling;
