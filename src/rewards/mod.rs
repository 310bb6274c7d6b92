//! Level rewards
//!
//! The reward catalogue and the per-level dispatch loop.

pub mod catalogue;
pub mod dispatch;

pub use catalogue::{Reward, RewardCatalogue, RewardTable};
pub use dispatch::{dispatch_rewards, DispatchSummary};
