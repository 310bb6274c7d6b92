//! Recording test doubles for the collaborator ports

use parking_lot::Mutex;
use std::sync::Arc;

use crate::owner::OwnerId;
use crate::presence::{Presence, Recipient};
use crate::rewards::{Reward, RewardCatalogue};

pub(crate) type GiveLog = Arc<Mutex<Vec<(&'static str, u64)>>>;

struct Tagged {
    tag: &'static str,
    given: GiveLog,
}

impl Reward for Tagged {
    fn give(&self, _recipient: &Recipient, level: u64) {
        self.given.lock().push((self.tag, level));
    }
}

/// Catalogue that records every lookup and every reward handed out
#[derive(Default)]
pub(crate) struct RecordingCatalogue {
    pub lookups: Mutex<Vec<u64>>,
    pub given: GiveLog,
    levels: Vec<u64>,
    every_level: bool,
    repeat_every: Option<u64>,
}

impl RecordingCatalogue {
    /// One-off reward at every level
    pub fn every_level() -> Self {
        Self { every_level: true, ..Self::default() }
    }

    pub fn at_levels(levels: &[u64]) -> Self {
        Self { levels: levels.to_vec(), ..Self::default() }
    }

    pub fn repeating_every(mut self, every: u64) -> Self {
        self.repeat_every = Some(every);
        self
    }

    pub fn given(&self) -> Vec<(&'static str, u64)> {
        self.given.lock().clone()
    }

    pub fn lookups(&self) -> Vec<u64> {
        self.lookups.lock().clone()
    }

    fn tagged(&self, tag: &'static str) -> Arc<dyn Reward> {
        Arc::new(Tagged { tag, given: Arc::clone(&self.given) })
    }
}

impl RewardCatalogue for RecordingCatalogue {
    fn reward(&self, level: u64) -> Option<Arc<dyn Reward>> {
        self.lookups.lock().push(level);
        if self.every_level || self.levels.contains(&level) {
            Some(self.tagged("level"))
        } else {
            None
        }
    }

    fn repeat_rewards(&self, level: u64) -> Vec<Arc<dyn Reward>> {
        match self.repeat_every {
            Some(every) if level % every == 0 => vec![self.tagged("repeat")],
            _ => Vec::new(),
        }
    }
}

/// Presence with a fixed online flag that records sent messages
#[derive(Default)]
pub(crate) struct RecordingPresence {
    pub online: bool,
    pub messages: Mutex<Vec<String>>,
}

impl RecordingPresence {
    pub fn online() -> Self {
        Self { online: true, ..Self::default() }
    }

    pub fn offline() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Presence for RecordingPresence {
    fn is_available(&self, _owner: &OwnerId) -> bool {
        self.online
    }

    fn resolve(&self, owner: &OwnerId) -> Option<Recipient> {
        self.online.then(|| Recipient::new(owner.clone(), "Steve"))
    }

    fn notify(&self, _recipient: &Recipient, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Storage whose writes always fail
pub(crate) struct FailingStorage;

impl crate::save::LevelStorage for FailingStorage {
    fn load_record(&self, _owner: &OwnerId) -> crate::error::Result<Option<crate::save::LevelRecord>> {
        Ok(None)
    }

    fn save_record(&self, owner: &OwnerId, _record: &crate::save::LevelRecord) -> crate::error::Result<()> {
        Err(crate::error::LevelError::Persistence {
            owner: owner.to_string(),
            reason: "disk full".to_string(),
        })
    }
}
