//! Per-month spending totals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::MonthData;

/// Aggregated view of one month record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub user: String,
    pub month: String,
    pub salary: f64,
    pub total_expenses: f64,
    pub total_fixed_expenses: f64,
    pub total: f64,
    /// Salary minus everything spent. Negative when over budget.
    pub remaining: f64,
    pub by_category: BTreeMap<String, f64>,
}

pub fn summarize(month: &MonthData) -> MonthSummary {
    let total_expenses: f64 = month.expenses.iter().map(|e| e.amount).sum();
    let total_fixed_expenses: f64 = month.fixed_expenses.iter().map(|f| f.amount).sum();
    let total = total_expenses + total_fixed_expenses;

    let mut by_category = BTreeMap::new();
    for expense in &month.expenses {
        *by_category.entry(expense.category.clone()).or_insert(0.0) += expense.amount;
    }

    MonthSummary {
        user: month.user.clone(),
        month: month.month.clone(),
        salary: month.salary,
        total_expenses,
        total_fixed_expenses,
        total,
        remaining: month.salary - total,
        by_category,
    }
}
