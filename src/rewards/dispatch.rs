//! Reward dispatch for a span of newly reached levels

use super::catalogue::RewardCatalogue;
use crate::presence::Recipient;

/// Result of one dispatch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchSummary {
    /// Levels visited
    pub levels: u64,
    /// `give` calls made
    pub rewards_given: usize,
}

/// Hand out rewards for every level in `(from, to]`
///
/// Each level gets its one-off reward, if any, followed by every repeating
/// reward configured for it. Each reward is given at most once per level.
pub fn dispatch_rewards<C: RewardCatalogue + ?Sized>(
    catalogue: &C,
    recipient: &Recipient,
    from: u64,
    to: u64,
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();

    for level in from.saturating_add(1)..=to {
        summary.levels += 1;

        if let Some(reward) = catalogue.reward(level) {
            reward.give(recipient, level);
            summary.rewards_given += 1;
        }

        for reward in catalogue.repeat_rewards(level) {
            reward.give(recipient, level);
            summary.rewards_given += 1;
        }
    }

    if summary.rewards_given > 0 {
        log::debug!(
            "Gave {} rewards to {} for levels {}..={}",
            summary.rewards_given, recipient.owner, from + 1, to
        );
    }
    summary
}
