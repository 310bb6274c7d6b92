//! Material ledger
//!
//! Per-owner material counts and legacy material-name normalization.

pub mod aliases;
pub mod materials;

pub use aliases::MaterialAliases;
pub use materials::MaterialLedger;
