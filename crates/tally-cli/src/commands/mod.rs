//! CLI command implementations for Tally.

pub mod check;
pub mod passwords;
pub mod serve;
