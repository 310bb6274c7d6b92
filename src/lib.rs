//! Terralevel - territory levelling for survival-sandbox game modes
//!
//! Counts of placed blocks become points, points become a level, and the
//! highest level an owner ever reached decides which rewards are due.

pub mod error;
pub mod owner;
pub mod ledger;
pub mod progression;
pub mod rewards;
pub mod presence;
pub mod save;
pub mod data;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use error::{LevelError, Result};
pub use owner::OwnerId;
pub use ledger::{MaterialAliases, MaterialLedger};
pub use progression::{LevelServices, LevelUp, ProgressionTracker};
pub use data::{LevellingConfig, SharedLevelling};
