//! # tally-core
//!
//! Shared types for the Tally expense tracker:
//!
//! - [`model`]: the persisted document (users, months, fixed-expense catalogs)
//! - [`reconcile`]: the rule that merges a month's fixed expenses into the
//!   owner's default catalog
//! - [`summary`]: per-month totals
//! - [`config`]: YAML configuration shared by every crate

pub mod categories;
pub mod config;
pub mod model;
pub mod reconcile;
pub mod summary;

pub use categories::{CATEGORIES, Category};
pub use config::{
    AuthConfig, ConfigError, HttpStoreConfig, LoggingConfig, ReconcileConfig, ServerConfig,
    StoreBackend, StoreConfig, TallyConfig,
};
pub use model::{AllData, Expense, FixedExpense, MonthData, User, seed_fixed_expenses};
pub use reconcile::{ExceptionalPolicy, Outcome, SaveError, reconcile, save_month};
pub use summary::{MonthSummary, summarize};
