//! Level data persistence
//!
//! One record per owner holding material counts, the highest level
//! reached and the starting-level baseline.

pub mod record;
pub mod store;

pub use record::{LevelRecord, LevellingRecord, MaterialEntry};
pub use store::{default_data_directory, InMemoryStorage, JsonFileStorage, LevelStorage};
