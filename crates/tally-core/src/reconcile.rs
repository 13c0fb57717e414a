//! Fixed-expense reconciliation.
//!
//! When a month is saved, its fixed-expense list and the owner's default
//! catalog are reconciled:
//!
//! - A non-empty submitted list is authoritative. Its non-exceptional entries
//!   replace the user's catalog wholesale.
//! - An empty submitted list means "new month, nothing entered yet". The
//!   user's catalog (or the legacy global one when the user has none) is
//!   copied into the month and the catalog is left alone.
//!
//! Nothing is merged field by field; the latest submission wins.

use serde::{Deserialize, Serialize};

use crate::model::{AllData, FixedExpense, MonthData, User};

/// What an exceptional charge does to the default catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionalPolicy {
    /// Exceptional entries are left out of the new catalog, so the charge is
    /// gone from every later month.
    #[default]
    Drop,
    /// Exceptional entries only affect the month they appear in. The catalog
    /// keeps whatever version of that charge it already had.
    Suppress,
}

/// Which source supplied a month's fixed expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The submitted list was kept and the catalog replaced.
    CatalogReplaced,
    /// The user's own catalog was copied into the month.
    CopiedFromUser,
    /// The legacy global catalog was copied into the month.
    CopiedFromLegacy,
}

/// Reconcile `month` against the owner's catalog.
///
/// Mutates `month.fixed_expenses` (empty lists are filled in) and
/// `user.default_fixed_expenses` (replaced when the submission is
/// authoritative).
pub fn reconcile(
    month: &mut MonthData,
    user: &mut User,
    legacy: &[FixedExpense],
    policy: ExceptionalPolicy,
) -> Outcome {
    if !month.fixed_expenses.is_empty() {
        let catalog = next_catalog(&month.fixed_expenses, user.defaults(), policy);
        user.default_fixed_expenses = Some(catalog);
        return Outcome::CatalogReplaced;
    }

    if !user.defaults().is_empty() {
        month.fixed_expenses = user.defaults().to_vec();
        Outcome::CopiedFromUser
    } else {
        month.fixed_expenses = legacy.to_vec();
        Outcome::CopiedFromLegacy
    }
}

fn next_catalog(
    submitted: &[FixedExpense],
    current: &[FixedExpense],
    policy: ExceptionalPolicy,
) -> Vec<FixedExpense> {
    let mut catalog: Vec<FixedExpense> = submitted
        .iter()
        .filter(|fx| !fx.is_exceptional())
        .cloned()
        .collect();

    if policy == ExceptionalPolicy::Suppress {
        let kept: Vec<FixedExpense> = submitted
            .iter()
            .filter(|fx| fx.is_exceptional())
            .filter_map(|fx| current.iter().find(|c| c.id == fx.id))
            .filter(|c| !catalog.iter().any(|k| k.id == c.id))
            .cloned()
            .collect();
        catalog.extend(kept);
    }

    catalog
}

/// Errors from [`save_month`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveError {
    #[error("user not found: {0}")]
    UnknownUser(String),
}

/// Reconcile a submitted month and upsert it into the document.
///
/// Returns the record as stored.
pub fn save_month(
    data: &mut AllData,
    mut month: MonthData,
    policy: ExceptionalPolicy,
) -> Result<MonthData, SaveError> {
    let legacy = data.default_fixed_expenses.clone();
    let user = data
        .user_mut(&month.user)
        .ok_or_else(|| SaveError::UnknownUser(month.user.clone()))?;

    let outcome = reconcile(&mut month, user, &legacy, policy);
    tracing::debug!(
        user = %month.user,
        month = %month.month,
        fixed = month.fixed_expenses.len(),
        ?outcome,
        "Reconciled fixed expenses"
    );

    let stored = month.clone();
    data.upsert_month(month);
    Ok(stored)
}
