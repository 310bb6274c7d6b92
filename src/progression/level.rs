//! Level formula
//!
//! Converts a point total into an integer level:
//! `round(points - subtraction - starting_level) / division`, with the
//! starting level acting as a baseline captured after a full rescan.

use serde::{Deserialize, Serialize};

/// Message sent when no template is configured
pub const DEFAULT_LEVEL_UP_MESSAGE: &str = "Your territory reached level %level%!";

/// What happens when an owner passes their highest level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelUpOptions {
    /// Issue level rewards
    pub rewards: bool,
    /// Notify the owner
    pub messages: bool,
    /// Notification template, `%level%` is replaced by the level reached.
    /// An empty template disables the notification.
    pub message: Option<String>,
}

impl Default for LevelUpOptions {
    fn default() -> Self {
        Self {
            rewards: true,
            messages: true,
            message: Some(DEFAULT_LEVEL_UP_MESSAGE.to_string()),
        }
    }
}

impl LevelUpOptions {
    /// Render the notification for `level`, if one should be sent
    pub fn format_message(&self, level: u64) -> Option<String> {
        if !self.messages {
            return None;
        }
        let template = self.message.as_deref().filter(|m| !m.is_empty())?;
        Some(template.replace("%level%", &level.to_string()))
    }
}

/// Division and subtraction read together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelFormula {
    pub division: i64,
    pub subtraction: i64,
}

/// Provider of the level formula parameters
pub trait LevelSettings: Send + Sync {
    /// Points per level. Values <= 0 are treated as 1.
    fn division(&self) -> i64;

    /// Flat amount removed from the raw score before leveling
    fn subtraction(&self) -> i64;

    /// Both parameters from the same config version
    fn formula(&self) -> LevelFormula {
        LevelFormula {
            division: self.division(),
            subtraction: self.subtraction(),
        }
    }

    fn level_up_options(&self) -> LevelUpOptions {
        LevelUpOptions::default()
    }
}

/// Point offset anchoring the level formula
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Baseline {
    /// Points already banked when the baseline was captured
    pub starting_level: f64,
    /// Set by a full ledger replacement, consumed by the next computation
    pub recalibrate: bool,
}

impl Baseline {
    pub fn new(starting_level: f64) -> Self {
        Self { starting_level, recalibrate: false }
    }
}

/// Compute a level and the baseline to carry forward
///
/// This is a total function: a zero division is treated as 1 and the
/// working point value never goes negative.
pub fn compute_level(raw_points: f64, division: i64, subtraction: i64, baseline: Baseline) -> (u64, Baseline) {
    let division = if division <= 0 { 1 } else { division as u64 };

    let subtraction = subtraction as f64;
    let points = if raw_points >= subtraction { raw_points - subtraction } else { 0.0 };

    let mut baseline = baseline;
    if baseline.recalibrate && baseline.starting_level == 0.0 {
        baseline.starting_level = points;
    }
    baseline.recalibrate = false;

    let working = if points - baseline.starting_level < 0.0 {
        // Score fell below the baseline (e.g. the point table shrank)
        baseline.starting_level = points;
        0.0
    } else {
        points - baseline.starting_level
    };

    (round_half_up(working) / division, baseline)
}

fn round_half_up(points: f64) -> u64 {
    (points + 0.5).floor() as u64
}
