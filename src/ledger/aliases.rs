//! Legacy material-name aliasing
//!
//! Older game versions report some blocks under names that were later
//! renamed. Every ledger read and write goes through [`MaterialAliases`]
//! so both spellings land on the same entry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lookup table of legacy id -> canonical id
///
/// Matching is case-insensitive on the legacy side. Ids without an alias
/// pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, String>", into = "HashMap<String, String>")]
pub struct MaterialAliases {
    aliases: HashMap<String, String>,
}

impl From<HashMap<String, String>> for MaterialAliases {
    fn from(table: HashMap<String, String>) -> Self {
        let mut aliases = Self::new();
        for (legacy, canonical) in &table {
            aliases.insert(legacy, canonical);
        }
        aliases
    }
}

impl From<MaterialAliases> for HashMap<String, String> {
    fn from(aliases: MaterialAliases) -> Self {
        aliases.aliases
    }
}

impl MaterialAliases {
    /// An empty table (identity normalization)
    pub fn new() -> Self {
        Self::default()
    }

    /// Redstone repeater states that were split into two block ids
    pub fn legacy_defaults() -> Self {
        let mut aliases = Self::new();
        aliases.insert("DIODE_BLOCK_OFF", "REPEATER");
        aliases.insert("DIODE_BLOCK_ON", "REPEATER");
        aliases
    }

    /// Register an alias. Returns the previous canonical id, if any.
    pub fn insert(&mut self, legacy: &str, canonical: &str) -> Option<String> {
        self.aliases.insert(legacy.to_uppercase(), canonical.to_string())
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, legacy: &str, canonical: &str) -> Self {
        self.insert(legacy, canonical);
        self
    }

    /// Map a material id to its canonical form
    pub fn normalize(&self, material: &str) -> String {
        if self.aliases.is_empty() {
            return material.to_string();
        }
        match self.aliases.get(&material.to_uppercase()) {
            Some(canonical) => canonical.clone(),
            None => material.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
