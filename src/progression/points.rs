//! Material scoring
//!
//! Turns a [`MaterialLedger`] into a point total using a per-material
//! weight and optional unit cap from a [`PointTable`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ledger::MaterialLedger;

/// Limit value meaning "count every unit"
pub const UNLIMITED: i64 = -1;

fn unlimited() -> i64 {
    UNLIMITED
}

/// Scoring weight and cap for one material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialConfig {
    /// Points earned per counted unit
    #[serde(default)]
    pub points: f64,
    /// Maximum number of units that score; negative means unlimited
    #[serde(default = "unlimited")]
    pub limit: i64,
}

impl MaterialConfig {
    pub fn new(points: f64, limit: i64) -> Self {
        Self { points, limit }
    }

    pub fn unlimited(points: f64) -> Self {
        Self::new(points, UNLIMITED)
    }

    /// The unit cap, if any
    pub fn cap(&self) -> Option<u64> {
        u64::try_from(self.limit).ok()
    }

    /// Number of units that count towards the score
    pub fn counted(&self, quantity: u64) -> u64 {
        match self.cap() {
            Some(cap) => quantity.min(cap),
            None => quantity,
        }
    }
}

/// Read-only source of per-material scoring rules
///
/// Implementations may be reloaded by the host at any time, so callers
/// look rules up on every computation instead of caching them.
pub trait PointTable: Send + Sync {
    /// False when no material table is configured at all
    fn is_available(&self) -> bool {
        true
    }

    /// Scoring rule for a canonical material id
    fn material_config(&self, material: &str) -> Option<MaterialConfig>;

    /// Score a whole ledger against one consistent view of the table
    fn score(&self, ledger: &MaterialLedger) -> f64 {
        compute_points(ledger, self)
    }

    /// Integer contribution of one material, see [`material_points`]
    fn score_material(&self, ledger: &MaterialLedger, material: &str) -> i64 {
        material_points(ledger, self, material)
    }
}

impl PointTable for HashMap<String, MaterialConfig> {
    fn material_config(&self, material: &str) -> Option<MaterialConfig> {
        self.get(material).copied()
    }
}

/// Total points for a ledger. No rounding is applied.
///
/// Materials missing from the table score nothing, and so do materials
/// with zero points per unit regardless of quantity.
pub fn compute_points<T: PointTable + ?Sized>(ledger: &MaterialLedger, table: &T) -> f64 {
    if !table.is_available() {
        return 0.0;
    }

    ledger
        .iter()
        .filter_map(|(material, quantity)| {
            let config = table.material_config(material)?;
            if config.points == 0.0 {
                return None;
            }
            Some(config.counted(quantity) as f64 * config.points)
        })
        .sum()
}

/// Integer point contribution of a single material
///
/// Points per unit are truncated to a whole number before multiplying,
/// which is how per-material breakdowns are displayed.
pub fn material_points<T: PointTable + ?Sized>(ledger: &MaterialLedger, table: &T, material: &str) -> i64 {
    if !table.is_available() {
        return 0;
    }

    let material = ledger.aliases().normalize(material);
    let Some(config) = table.material_config(&material) else {
        return 0;
    };
    if !ledger.has_material(&material) {
        return 0;
    }

    let per_unit = config.points.trunc() as i64;
    if per_unit == 0 {
        return 0;
    }
    let counted = i64::try_from(config.counted(ledger.get(&material))).unwrap_or(i64::MAX);
    counted.saturating_mul(per_unit)
}
