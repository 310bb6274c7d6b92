//! Per-owner progression tracking
//!
//! [`ProgressionTracker`] owns one owner's material ledger, their highest
//! level reached and the starting-level baseline. The highest level only
//! ever grows (short of an explicit reset) and gates reward issuance, so a
//! territory that loses blocks and regains them cannot farm rewards.

use std::collections::HashMap;
use std::sync::Arc;

use super::level::{compute_level, Baseline, LevelSettings};
use super::points::PointTable;
use crate::data::SharedLevelling;
use crate::error::{LevelError, Result};
use crate::ledger::{MaterialAliases, MaterialLedger};
use crate::owner::OwnerId;
use crate::presence::{find_recipient, Presence};
use crate::rewards::{dispatch_rewards, RewardCatalogue};
use crate::save::{LevelRecord, LevelStorage};

/// Collaborators a tracker is built with
#[derive(Clone)]
pub struct LevelServices {
    pub storage: Arc<dyn LevelStorage>,
    pub points: Arc<dyn PointTable>,
    pub settings: Arc<dyn LevelSettings>,
    pub rewards: Arc<dyn RewardCatalogue>,
    pub presence: Arc<dyn Presence>,
    pub aliases: Arc<MaterialAliases>,
    /// Set when points and settings both come from this config
    pub levelling: Option<Arc<SharedLevelling>>,
}

impl LevelServices {
    pub fn new(
        storage: Arc<dyn LevelStorage>,
        points: Arc<dyn PointTable>,
        settings: Arc<dyn LevelSettings>,
        rewards: Arc<dyn RewardCatalogue>,
        presence: Arc<dyn Presence>,
    ) -> Self {
        Self {
            storage,
            points,
            settings,
            rewards,
            presence,
            aliases: Arc::new(MaterialAliases::new()),
            levelling: None,
        }
    }

    /// Use one shared config as point table and level settings, taking
    /// its current alias table
    pub fn from_levelling(
        levelling: Arc<SharedLevelling>,
        storage: Arc<dyn LevelStorage>,
        rewards: Arc<dyn RewardCatalogue>,
        presence: Arc<dyn Presence>,
    ) -> Self {
        let aliases = levelling.snapshot().aliases;
        Self {
            levelling: Some(levelling.clone()),
            ..Self::new(storage, levelling.clone(), levelling, rewards, presence).with_aliases(aliases)
        }
    }

    pub fn with_aliases(mut self, aliases: MaterialAliases) -> Self {
        self.aliases = Arc::new(aliases);
        self
    }
}

/// Outcome of [`ProgressionTracker::check_level_up`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelUp {
    /// Current level did not pass the highest level reached
    Unchanged { level: u64, highest: u64 },
    /// New highest level
    Advanced {
        from: u64,
        to: u64,
        /// Rewards handed out, 0 when the owner was offline
        rewards_given: usize,
        notified: bool,
    },
}

impl LevelUp {
    pub fn is_advanced(&self) -> bool {
        matches!(self, LevelUp::Advanced { .. })
    }

    /// The level computed during the check
    pub fn level(&self) -> u64 {
        match *self {
            LevelUp::Unchanged { level, .. } => level,
            LevelUp::Advanced { to, .. } => to,
        }
    }
}

/// Last result a scan reported for this owner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct LastCalculation {
    points: f64,
    level: u64,
}

/// One owner's territory level
pub struct ProgressionTracker {
    owner: OwnerId,
    ledger: MaterialLedger,
    highest_level: u64,
    baseline: Baseline,
    last_calculated: LastCalculation,
    /// Highest level or baseline changed since the last save
    state_dirty: bool,
    services: LevelServices,
}

impl ProgressionTracker {
    /// Load an owner's tracker from storage
    ///
    /// A record without a highest level gets one backfilled from the
    /// current materials, computed before the stored baseline is applied.
    pub fn load(owner: OwnerId, services: LevelServices) -> Result<Self> {
        let record = services.storage.load_record(&owner)?.unwrap_or_default();
        let ledger = MaterialLedger::from_counts(record.material_counts(), Arc::clone(&services.aliases));

        let mut tracker = Self {
            owner,
            ledger,
            highest_level: 0,
            baseline: Baseline::default(),
            last_calculated: LastCalculation::default(),
            state_dirty: false,
            services,
        };

        match record.highest_level() {
            Some(highest) => tracker.highest_level = highest,
            None => {
                tracker.highest_level = tracker.level();
                tracker.state_dirty = true;
                log::debug!("Backfilled highest level {} for {}", tracker.highest_level, tracker.owner);
            }
        }
        tracker.baseline = Baseline::new(record.starting_level());

        log::debug!(
            "Loaded progression for {}: {} materials, highest level {}",
            tracker.owner,
            tracker.ledger.len(),
            tracker.highest_level
        );
        Ok(tracker)
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// Re-key this tracker to a new owner. The next save writes under the new id.
    pub fn transfer_owner(&mut self, owner: OwnerId) {
        log::info!("Transferring level data from {} to {}", self.owner, owner);
        self.owner = owner;
        self.state_dirty = true;
    }

    pub fn ledger(&self) -> &MaterialLedger {
        &self.ledger
    }

    pub fn material_amount(&self, material: &str) -> u64 {
        self.ledger.get(material)
    }

    pub fn set_material(&mut self, material: &str, amount: u64) {
        self.ledger.set(material, amount);
    }

    pub fn add_material(&mut self, material: &str, delta: i64) {
        self.ledger.add(material, delta);
    }

    pub fn remove_material(&mut self, material: &str) -> Option<u64> {
        self.ledger.remove(material)
    }

    pub fn has_material(&self, material: &str) -> bool {
        self.ledger.has_material(material)
    }

    pub fn has_any_material(&self) -> bool {
        self.ledger.has_any_material()
    }

    pub fn materials(&self) -> HashMap<String, u64> {
        self.ledger.snapshot()
    }

    /// Replace all counts after a full rescan
    ///
    /// The next level read recaptures the baseline if none is set.
    pub fn replace_materials(&mut self, counts: impl IntoIterator<Item = (String, u64)>) {
        self.ledger.replace_all(counts);
        self.baseline.recalibrate = true;
    }

    /// Unrounded point total against the current point table
    pub fn points(&self) -> f64 {
        self.services.points.score(&self.ledger)
    }

    /// Integer contribution of one material
    pub fn material_points(&self, material: &str) -> i64 {
        self.services.points.score_material(&self.ledger, material)
    }

    /// Current level. May move the baseline.
    pub fn level(&mut self) -> u64 {
        let (points, formula) = match &self.services.levelling {
            Some(levelling) => {
                let config = levelling.read();
                (config.score(&self.ledger), config.formula())
            }
            None => (self.points(), self.services.settings.formula()),
        };
        let (level, baseline) = compute_level(points, formula.division, formula.subtraction, self.baseline);

        if baseline.starting_level != self.baseline.starting_level {
            log::debug!(
                "Starting level for {} moved from {} to {}",
                self.owner,
                self.baseline.starting_level,
                baseline.starting_level
            );
            self.state_dirty = true;
        }
        self.baseline = baseline;
        level
    }

    pub fn highest_level(&self) -> u64 {
        self.highest_level
    }

    pub fn starting_level(&self) -> f64 {
        self.baseline.starting_level
    }

    /// Whether the next level read will recapture the baseline
    pub fn needs_recalibration(&self) -> bool {
        self.baseline.recalibrate
    }

    /// Explicitly reset the highest level, e.g. when a territory is wiped
    pub fn reset_highest_level(&mut self, level: u64) {
        log::info!("Resetting highest level for {} from {} to {}", self.owner, self.highest_level, level);
        self.highest_level = level;
        self.state_dirty = true;
    }

    pub fn last_calculated_points(&self) -> f64 {
        self.last_calculated.points
    }

    pub fn last_calculated_level(&self) -> u64 {
        self.last_calculated.level
    }

    /// Remember what the latest scan reported
    pub fn set_last_calculated(&mut self, points: f64, level: u64) {
        self.last_calculated = LastCalculation { points, level };
    }

    /// Compare the current level against the highest level reached and
    /// hand out rewards for every newly reached level
    ///
    /// Rewards and the notification need the owner online. The highest
    /// level advances either way, so the same span never pays out twice.
    pub fn check_level_up(&mut self) -> LevelUp {
        let level = self.level();
        if level <= self.highest_level {
            return LevelUp::Unchanged { level, highest: self.highest_level };
        }

        let from = self.highest_level;
        let options = self.services.settings.level_up_options();
        let mut rewards_given = 0;
        let mut notified = false;

        match find_recipient(self.services.presence.as_ref(), &self.owner) {
            Some(recipient) => {
                if options.rewards {
                    rewards_given =
                        dispatch_rewards(self.services.rewards.as_ref(), &recipient, from, level).rewards_given;
                }
                // One message for the final level, however many were crossed
                if let Some(message) = options.format_message(level) {
                    self.services.presence.notify(&recipient, &message);
                    notified = true;
                }
            }
            None => log::debug!(
                "{} is offline, skipping rewards for levels {}..={}",
                self.owner,
                from + 1,
                level
            ),
        }

        log::info!("{} reached level {} (previous highest {})", self.owner, level, from);
        self.highest_level = level;
        self.state_dirty = true;

        LevelUp::Advanced { from, to: level, rewards_given, notified }
    }

    /// Unsaved changes to materials, highest level or baseline
    pub fn is_dirty(&self) -> bool {
        self.state_dirty || self.ledger.is_dirty()
    }

    pub fn to_record(&self) -> LevelRecord {
        LevelRecord::new(self.ledger.snapshot(), Some(self.highest_level), self.baseline.starting_level)
    }

    /// Write the record through the storage port
    ///
    /// On failure the in-memory state is kept as is and stays dirty.
    pub fn save(&mut self) -> Result<()> {
        let record = self.to_record();
        match self.services.storage.save_record(&self.owner, &record) {
            Ok(()) => {
                self.ledger.mark_clean();
                self.state_dirty = false;
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to save level data for {}: {}", self.owner, e);
                Err(match e {
                    LevelError::Persistence { .. } => e,
                    other => LevelError::Persistence {
                        owner: self.owner.to_string(),
                        reason: other.to_string(),
                    },
                })
            }
        }
    }
}

impl std::fmt::Debug for ProgressionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressionTracker")
            .field("owner", &self.owner)
            .field("materials", &self.ledger.len())
            .field("highest_level", &self.highest_level)
            .field("baseline", &self.baseline)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LevellingConfig;
    use crate::progression::MaterialConfig;
    use crate::save::InMemoryStorage;
    use crate::testing::{init_logging, FailingStorage, RecordingCatalogue, RecordingPresence};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Harness {
        storage: Arc<InMemoryStorage>,
        levelling: Arc<SharedLevelling>,
        rewards: Arc<RecordingCatalogue>,
        presence: Arc<RecordingPresence>,
    }

    impl Harness {
        fn new(config: LevellingConfig) -> Self {
            init_logging();
            Self {
                storage: Arc::new(InMemoryStorage::new()),
                levelling: Arc::new(SharedLevelling::new(config)),
                rewards: Arc::new(RecordingCatalogue::every_level()),
                presence: Arc::new(RecordingPresence::online()),
            }
        }

        fn services(&self) -> LevelServices {
            LevelServices::from_levelling(
                self.levelling.clone(),
                self.storage.clone(),
                self.rewards.clone(),
                self.presence.clone(),
            )
        }

        fn tracker(&self) -> ProgressionTracker {
            ProgressionTracker::load(owner(), self.services()).unwrap()
        }
    }

    fn owner() -> OwnerId {
        OwnerId::new("owner-1")
    }

    fn stone_config(subtraction: i64) -> LevellingConfig {
        LevellingConfig {
            division: 10,
            subtraction,
            aliases: MaterialAliases::legacy_defaults(),
            ..LevellingConfig::default()
        }
        .with_material("STONE", MaterialConfig::new(1.0, 50))
        .with_material("IRON_BLOCK", MaterialConfig::unlimited(10.0))
    }

    #[test]
    fn test_capped_stone_reaches_level_five() {
        let harness = Harness::new(stone_config(0));
        let mut tracker = harness.tracker();
        tracker.set_material("STONE", 100);

        assert_eq!(tracker.points(), 50.0);
        assert_eq!(tracker.level(), 5);
    }

    #[test]
    fn test_subtraction_lowers_level() {
        let harness = Harness::new(stone_config(20));
        let mut tracker = harness.tracker();
        tracker.set_material("STONE", 100);

        assert_eq!(tracker.level(), 3);
    }

    #[test]
    fn test_rewards_for_every_crossed_level() {
        let harness = Harness::new(stone_config(0));
        harness.storage.insert(owner(), LevelRecord::new(Vec::new(), Some(2), 0.0));

        let mut tracker = harness.tracker();
        tracker.set_material("STONE", 50);
        let outcome = tracker.check_level_up();

        assert_eq!(outcome, LevelUp::Advanced { from: 2, to: 5, rewards_given: 3, notified: true });
        assert_eq!(harness.rewards.lookups(), vec![3, 4, 5]);
        assert_eq!(harness.rewards.given(), vec![("level", 3), ("level", 4), ("level", 5)]);
        assert_eq!(harness.presence.messages(), vec!["Your territory reached level 5!".to_string()]);
        assert_eq!(tracker.highest_level(), 5);
    }

    #[test]
    fn test_repeating_rewards_dispatched() {
        let mut harness = Harness::new(stone_config(0));
        harness.rewards = Arc::new(RecordingCatalogue::at_levels(&[3]).repeating_every(2));

        let mut tracker = harness.tracker();
        tracker.set_material("STONE", 40);
        tracker.check_level_up();

        assert_eq!(
            harness.rewards.given(),
            vec![("repeat", 2), ("level", 3), ("repeat", 4)]
        );
    }

    #[test]
    fn test_no_rewards_at_or_below_highest() {
        let harness = Harness::new(stone_config(0));
        let mut tracker = harness.tracker();
        tracker.set_material("STONE", 30);
        assert!(tracker.check_level_up().is_advanced());

        let given = harness.rewards.given().len();
        let messages = harness.presence.messages().len();

        // Same level again, then a dip and recovery
        assert_eq!(tracker.check_level_up(), LevelUp::Unchanged { level: 3, highest: 3 });
        tracker.set_material("STONE", 10);
        assert_eq!(tracker.check_level_up(), LevelUp::Unchanged { level: 1, highest: 3 });
        tracker.set_material("STONE", 30);
        assert!(!tracker.check_level_up().is_advanced());

        assert_eq!(harness.rewards.given().len(), given);
        assert_eq!(harness.presence.messages().len(), messages);
        assert_eq!(tracker.highest_level(), 3);
    }

    #[test]
    fn test_highest_level_never_decreases() {
        let harness = Harness::new(stone_config(0));
        let mut tracker = harness.tracker();

        let mut previous = tracker.highest_level();
        for amount in [10, 40, 20, 0, 50, 30, 100, 5] {
            tracker.set_material("STONE", amount);
            tracker.check_level_up();
            assert!(tracker.highest_level() >= previous);
            previous = tracker.highest_level();
        }
        assert_eq!(previous, 5);
    }

    #[test]
    fn test_offline_owner_still_advances() {
        let mut harness = Harness::new(stone_config(0));
        harness.presence = Arc::new(RecordingPresence::offline());

        let mut tracker = harness.tracker();
        tracker.set_material("STONE", 50);
        let outcome = tracker.check_level_up();

        assert_eq!(outcome, LevelUp::Advanced { from: 0, to: 5, rewards_given: 0, notified: false });
        assert!(harness.rewards.lookups().is_empty());
        assert!(harness.presence.messages().is_empty());
        assert_eq!(tracker.highest_level(), 5);

        // Coming back online later does not pay out the same span
        tracker.check_level_up();
        assert!(harness.rewards.lookups().is_empty());
    }

    #[test]
    fn test_level_up_options_respected() {
        let mut config = stone_config(0);
        config.level_up.rewards = false;
        config.level_up.message = Some("Level %level% reached".to_string());
        let harness = Harness::new(config);

        let mut tracker = harness.tracker();
        tracker.set_material("STONE", 20);
        let outcome = tracker.check_level_up();

        assert_eq!(outcome, LevelUp::Advanced { from: 0, to: 2, rewards_given: 0, notified: true });
        assert!(harness.rewards.lookups().is_empty());
        assert_eq!(harness.presence.messages(), vec!["Level 2 reached".to_string()]);
    }

    #[test]
    fn test_replace_materials_recalibrates_baseline() {
        let harness = Harness::new(stone_config(0));
        let mut tracker = harness.tracker();
        tracker.set_material("IRON_BLOCK", 3);
        tracker.check_level_up();
        assert_eq!(tracker.highest_level(), 3);

        tracker.replace_materials(vec![("IRON_BLOCK".to_string(), 8)]);
        assert!(tracker.needs_recalibration());

        assert_eq!(tracker.level(), 0);
        assert_eq!(tracker.starting_level(), 80.0);
        assert!(!tracker.needs_recalibration());
        assert!(!tracker.has_material("STONE"));

        tracker.add_material("IRON_BLOCK", 2);
        assert_eq!(tracker.level(), 2);
        assert!(!tracker.check_level_up().is_advanced());
    }

    #[test]
    fn test_point_table_reload_applies_immediately() {
        let harness = Harness::new(stone_config(0));
        let mut tracker = harness.tracker();
        tracker.set_material("IRON_BLOCK", 5);
        assert_eq!(tracker.level(), 5);

        harness.levelling.replace(
            stone_config(0).with_material("IRON_BLOCK", MaterialConfig::unlimited(20.0)),
        );
        assert_eq!(tracker.points(), 100.0);
        assert_eq!(tracker.level(), 10);
    }

    #[test]
    fn test_shrinking_table_resets_baseline() {
        let harness = Harness::new(stone_config(0));
        harness.storage.insert(owner(), LevelRecord::new(vec![("IRON_BLOCK".to_string(), 10)], Some(0), 60.0));

        let mut tracker = harness.tracker();
        assert_eq!(tracker.level(), 4);

        harness.levelling.replace(
            stone_config(0).with_material("IRON_BLOCK", MaterialConfig::unlimited(5.0)),
        );
        assert_eq!(tracker.level(), 0);
        assert_eq!(tracker.starting_level(), 50.0);
    }

    #[test]
    fn test_load_backfills_highest_level() {
        let harness = Harness::new(stone_config(0));
        harness.storage.insert(owner(), LevelRecord::new(vec![("IRON_BLOCK".to_string(), 10)], None, 30.0));

        let mut tracker = harness.tracker();
        assert_eq!(tracker.highest_level(), 10);
        assert_eq!(tracker.starting_level(), 30.0);
        assert_eq!(tracker.level(), 7);
        assert!(tracker.is_dirty());
    }

    #[test]
    fn test_load_reads_existing_record() {
        let harness = Harness::new(stone_config(0));
        harness.storage.insert(
            owner(),
            LevelRecord::new(vec![("STONE".to_string(), 12), ("DIODE_BLOCK_ON".to_string(), 2)], Some(9), 4.5),
        );

        let tracker = harness.tracker();
        assert_eq!(tracker.material_amount("STONE"), 12);
        assert_eq!(tracker.material_amount("REPEATER"), 2);
        assert_eq!(tracker.highest_level(), 9);
        assert_eq!(tracker.starting_level(), 4.5);
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn test_save_writes_record() {
        let harness = Harness::new(stone_config(0));
        let mut tracker = harness.tracker();
        tracker.set_material("STONE", 30);
        tracker.check_level_up();
        assert!(tracker.is_dirty());

        tracker.save().unwrap();
        assert!(!tracker.is_dirty());

        let record = harness.storage.get(&owner()).unwrap();
        assert_eq!(record.highest_level(), Some(3));
        assert_eq!(record.material_counts().collect::<Vec<_>>(), vec![("STONE".to_string(), 30)]);

        let reloaded = harness.tracker();
        assert_eq!(reloaded.highest_level(), 3);
        assert_eq!(reloaded.material_amount("STONE"), 30);
    }

    #[test]
    fn test_level_reads_one_config_during_reload() {
        // Both configs put 100 stone at level 10. Mixing them gives 5 or 20.
        let slow = LevellingConfig { division: 10, ..LevellingConfig::default() }
            .with_material("STONE", MaterialConfig::unlimited(1.0));
        let fast = LevellingConfig { division: 20, ..LevellingConfig::default() }
            .with_material("STONE", MaterialConfig::unlimited(2.0));

        let harness = Harness::new(slow.clone());
        let mut tracker = harness.tracker();
        tracker.set_material("STONE", 100);

        let done = AtomicBool::new(false);
        std::thread::scope(|scope| {
            scope.spawn(|| {
                let mut flip = false;
                while !done.load(Ordering::Relaxed) {
                    harness.levelling.replace(if flip { slow.clone() } else { fast.clone() });
                    flip = !flip;
                }
            });

            for _ in 0..2_000 {
                assert_eq!(tracker.level(), 10);
            }
            done.store(true, Ordering::Relaxed);
        });
    }

    #[test]
    fn test_failed_save_keeps_state() {
        let harness = Harness::new(stone_config(0));
        let services = LevelServices {
            storage: Arc::new(FailingStorage),
            ..harness.services()
        };
        let mut tracker = ProgressionTracker::load(owner(), services).unwrap();
        tracker.set_material("STONE", 50);
        tracker.check_level_up();

        let result = tracker.save();
        assert!(matches!(result, Err(LevelError::Persistence { .. })));
        assert!(tracker.is_dirty());
        assert_eq!(tracker.highest_level(), 5);
        assert_eq!(tracker.material_amount("STONE"), 50);
    }

    #[test]
    fn test_transfer_owner_saves_under_new_id() {
        let harness = Harness::new(stone_config(0));
        let mut tracker = harness.tracker();
        tracker.set_material("STONE", 10);
        tracker.save().unwrap();

        tracker.transfer_owner(OwnerId::new("owner-2"));
        assert!(tracker.is_dirty());
        tracker.save().unwrap();

        let moved = harness.storage.get(&OwnerId::new("owner-2")).unwrap();
        assert_eq!(moved.material_counts().count(), 1);
    }

    #[test]
    fn test_material_points_and_last_calculated() {
        let harness = Harness::new(stone_config(0));
        let mut tracker = harness.tracker();
        tracker.set_material("IRON_BLOCK", 4);
        assert_eq!(tracker.material_points("IRON_BLOCK"), 40);
        assert_eq!(tracker.material_points("GOLD_BLOCK"), 0);

        tracker.set_last_calculated(40.0, 4);
        assert_eq!(tracker.last_calculated_points(), 40.0);
        assert_eq!(tracker.last_calculated_level(), 4);
    }

    #[test]
    fn test_reset_highest_level() {
        let harness = Harness::new(stone_config(0));
        let mut tracker = harness.tracker();
        tracker.set_material("STONE", 50);
        tracker.check_level_up();

        tracker.reset_highest_level(0);
        assert_eq!(tracker.highest_level(), 0);
        assert!(tracker.check_level_up().is_advanced());
    }
}
