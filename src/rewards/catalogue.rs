//! Reward catalogue
//!
//! How a reward is applied (items, money, commands) is up to the host;
//! the core only decides which rewards are due for which level.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::presence::Recipient;

/// Something handed to an owner on reaching a level
pub trait Reward: Send + Sync {
    fn give(&self, recipient: &Recipient, level: u64);
}

impl<F> Reward for F
where
    F: Fn(&Recipient, u64) + Send + Sync,
{
    fn give(&self, recipient: &Recipient, level: u64) {
        self(recipient, level)
    }
}

/// Lookup of rewards by level
pub trait RewardCatalogue: Send + Sync {
    /// The one-off reward for exactly this level
    fn reward(&self, level: u64) -> Option<Arc<dyn Reward>>;

    /// Repeating rewards that apply at this level
    fn repeat_rewards(&self, level: u64) -> Vec<Arc<dyn Reward>>;
}

/// In-memory catalogue: one-off rewards keyed by level plus rewards
/// repeating every N levels
#[derive(Clone, Default)]
pub struct RewardTable {
    levels: BTreeMap<u64, Arc<dyn Reward>>,
    repeating: Vec<(u64, Arc<dyn Reward>)>,
}

impl RewardTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reward given once, when `level` is first reached
    pub fn with_reward(mut self, level: u64, reward: impl Reward + 'static) -> Self {
        self.levels.insert(level, Arc::new(reward));
        self
    }

    /// Reward given at every multiple of `every`. `every == 0` is ignored.
    pub fn with_repeating(mut self, every: u64, reward: impl Reward + 'static) -> Self {
        if every == 0 {
            log::warn!("Ignoring repeating reward with an interval of 0");
            return self;
        }
        self.repeating.push((every, Arc::new(reward)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty() && self.repeating.is_empty()
    }
}

impl fmt::Debug for RewardTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewardTable")
            .field("levels", &self.levels.keys().collect::<Vec<_>>())
            .field("repeating", &self.repeating.iter().map(|(every, _)| every).collect::<Vec<_>>())
            .finish()
    }
}

impl RewardCatalogue for RewardTable {
    fn reward(&self, level: u64) -> Option<Arc<dyn Reward>> {
        self.levels.get(&level).cloned()
    }

    fn repeat_rewards(&self, level: u64) -> Vec<Arc<dyn Reward>> {
        self.repeating
            .iter()
            .filter(|(every, _)| level % every == 0)
            .map(|(_, reward)| Arc::clone(reward))
            .collect()
    }
}
