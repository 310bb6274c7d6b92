//! Error types
//!
//! Only the I/O boundaries (record storage, config files) can fail. Scoring
//! and leveling math is total and never produces an error.

use thiserror::Error;

/// Errors surfaced by the levelling core
#[derive(Debug, Error)]
pub enum LevelError {
    /// Filesystem failure while reading or writing a document
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record or config document could not be decoded
    #[error("parse error: {0}")]
    Parse(String),

    /// Writing an owner's record failed. In-memory state stays authoritative.
    #[error("failed to persist level data for {owner}: {reason}")]
    Persistence { owner: String, reason: String },

    /// A config document was rejected
    #[error("invalid levelling config: {0}")]
    Config(String),
}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        LevelError::Parse(e.to_string())
    }
}

impl From<ron::error::SpannedError> for LevelError {
    fn from(e: ron::error::SpannedError) -> Self {
        LevelError::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LevelError>;
