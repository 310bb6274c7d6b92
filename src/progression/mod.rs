//! Progression systems
//!
//! Scoring, the level formula and the per-owner progression tracker.

pub mod level;
pub mod points;
pub mod tracker;

pub use level::{compute_level, Baseline, LevelFormula, LevelSettings, LevelUpOptions, DEFAULT_LEVEL_UP_MESSAGE};
pub use points::{compute_points, material_points, MaterialConfig, PointTable, UNLIMITED};
pub use tracker::{LevelServices, LevelUp, ProgressionTracker};
