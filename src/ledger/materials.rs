//! Per-owner material counts
//!
//! The ledger is the unit of mutation for an owner's territory: scans and
//! block events add, set or remove counts here, and scoring reads them.

use std::collections::HashMap;
use std::sync::Arc;

use super::aliases::MaterialAliases;

/// Mapping of material id -> quantity for one owner
///
/// Absent materials read as 0. Setting a material to 0 keeps the entry,
/// [`remove`](Self::remove) drops it.
#[derive(Debug, Clone, Default)]
pub struct MaterialLedger {
    materials: HashMap<String, u64>,
    aliases: Arc<MaterialAliases>,
    dirty: bool,
}

impl MaterialLedger {
    pub fn new(aliases: Arc<MaterialAliases>) -> Self {
        Self {
            materials: HashMap::new(),
            aliases,
            dirty: false,
        }
    }

    /// Rebuild a ledger from persisted counts. The result starts clean.
    pub fn from_counts(counts: impl IntoIterator<Item = (String, u64)>, aliases: Arc<MaterialAliases>) -> Self {
        let mut ledger = Self::new(aliases);
        ledger.materials = ledger.normalized(counts);
        ledger
    }

    /// Stored quantity, or 0 when absent
    pub fn get(&self, material: &str) -> u64 {
        let material = self.aliases.normalize(material);
        self.materials.get(&material).copied().unwrap_or(0)
    }

    /// Store a quantity. 0 is a real value, distinct from removal.
    pub fn set(&mut self, material: &str, quantity: u64) {
        let material = self.aliases.normalize(material);
        self.materials.insert(material, quantity);
        self.dirty = true;
    }

    /// Adjust a quantity by a signed delta, saturating at 0
    pub fn add(&mut self, material: &str, delta: i64) {
        let quantity = self.get(material).saturating_add_signed(delta);
        self.set(material, quantity);
    }

    /// Drop the entry entirely. Returns the removed quantity.
    pub fn remove(&mut self, material: &str) -> Option<u64> {
        let material = self.aliases.normalize(material);
        let removed = self.materials.remove(&material);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn has_material(&self, material: &str) -> bool {
        self.materials.contains_key(&self.aliases.normalize(material))
    }

    pub fn has_any_material(&self) -> bool {
        !self.materials.is_empty()
    }

    /// Owned copy of the current counts
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.materials.clone()
    }

    /// Iterate entries without copying
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.materials.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Replace every entry, as after a full territory rescan
    ///
    /// Incoming ids are normalized; counts that collapse onto the same
    /// canonical id are summed.
    pub fn replace_all(&mut self, counts: impl IntoIterator<Item = (String, u64)>) {
        self.materials = self.normalized(counts);
        self.dirty = true;
    }

    /// Whether there are unsaved mutations
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn aliases(&self) -> &MaterialAliases {
        &self.aliases
    }

    fn normalized(&self, counts: impl IntoIterator<Item = (String, u64)>) -> HashMap<String, u64> {
        let mut materials: HashMap<String, u64> = HashMap::new();
        for (material, quantity) in counts {
            let entry = materials.entry(self.aliases.normalize(&material)).or_insert(0);
            *entry = entry.saturating_add(quantity);
        }
        materials
    }
}
