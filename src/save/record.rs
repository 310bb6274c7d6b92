//! Persisted record layout
//!
//! ```text
//! Levelling:
//!   Materials:
//!     <material>:
//!       Amount: <integer>
//!   Highest-Level: <integer>
//!   Starting-Level: <float>
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete per-owner record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    #[serde(rename = "Levelling", default)]
    pub levelling: LevellingRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevellingRecord {
    #[serde(rename = "Materials", default)]
    pub materials: BTreeMap<String, MaterialEntry>,
    /// Absent for owners that never had a level evaluated
    #[serde(rename = "Highest-Level", default, skip_serializing_if = "Option::is_none")]
    pub highest_level: Option<u64>,
    #[serde(rename = "Starting-Level", default)]
    pub starting_level: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialEntry {
    #[serde(rename = "Amount", default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
}

impl LevelRecord {
    pub fn new(
        materials: impl IntoIterator<Item = (String, u64)>,
        highest_level: Option<u64>,
        starting_level: f64,
    ) -> Self {
        let materials = materials
            .into_iter()
            .map(|(material, amount)| (material, MaterialEntry { amount: Some(amount) }))
            .collect();
        Self {
            levelling: LevellingRecord { materials, highest_level, starting_level },
        }
    }

    /// Material counts. Entries without an amount are skipped.
    pub fn material_counts(&self) -> impl Iterator<Item = (String, u64)> + '_ {
        self.levelling
            .materials
            .iter()
            .filter_map(|(material, entry)| entry.amount.map(|amount| (material.clone(), amount)))
    }

    pub fn highest_level(&self) -> Option<u64> {
        self.levelling.highest_level
    }

    pub fn starting_level(&self) -> f64 {
        self.levelling.starting_level
    }
}
