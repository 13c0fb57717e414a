//! Persisted document types.
//!
//! The whole dataset lives in one JSON object ([`AllData`]). Field names are
//! camelCase on the wire so documents written by earlier versions of the
//! tracker load unchanged.

use serde::{Deserialize, Serialize};

/// A recurring monthly charge (rent, subscriptions, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedExpense {
    pub id: String,
    pub amount: f64,
    pub description: String,
    /// One-time deviation, never carried forward as a default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_exceptional: Option<bool>,
}

impl FixedExpense {
    pub fn new(id: impl Into<String>, amount: f64, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            amount,
            description: description.into(),
            is_exceptional: None,
        }
    }

    /// Mark this charge as exceptional.
    pub fn exceptional(mut self) -> Self {
        self.is_exceptional = Some(true);
        self
    }

    pub fn is_exceptional(&self) -> bool {
        self.is_exceptional == Some(true)
    }
}

/// An ad hoc variable expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub date: String,
}

/// Budget data for one user and one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthData {
    /// Empty for months written before multi-user support.
    #[serde(default)]
    pub user: String,
    pub month: String,
    #[serde(default)]
    pub salary: f64,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub fixed_expenses: Vec<FixedExpense>,
}

impl MonthData {
    pub fn new(user: impl Into<String>, month: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            month: month.into(),
            salary: 0.0,
            expenses: Vec::new(),
            fixed_expenses: Vec::new(),
        }
    }

    /// Whether this record is stored under `(user, month)`.
    pub fn is_key(&self, user: &str, month: &str) -> bool {
        self.user == user && self.month == month
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    /// Argon2 PHC string, or a plaintext value in legacy documents.
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_fixed_expenses: Option<Vec<FixedExpense>>,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            default_fixed_expenses: None,
        }
    }

    /// The user's default catalog, empty when never set.
    pub fn defaults(&self) -> &[FixedExpense] {
        self.default_fixed_expenses.as_deref().unwrap_or(&[])
    }
}

/// The entire persisted state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllData {
    #[serde(default)]
    pub users: Vec<User>,
    /// Legacy catalog shared by every user. Only read as a fallback.
    #[serde(default)]
    pub default_fixed_expenses: Vec<FixedExpense>,
    #[serde(default)]
    pub months: Vec<MonthData>,
    /// Bumped by the store on every successful save.
    #[serde(default)]
    pub revision: u64,
}

impl AllData {
    /// Empty document whose legacy catalog holds the seed charges.
    pub fn seeded() -> Self {
        Self {
            default_fixed_expenses: seed_fixed_expenses(),
            ..Default::default()
        }
    }

    pub fn user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn user_mut(&mut self, username: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.username == username)
    }

    pub fn month(&self, user: &str, month: &str) -> Option<&MonthData> {
        self.months.iter().find(|m| m.is_key(user, month))
    }

    /// Replace the record stored under the same key, or append it.
    ///
    /// Returns `true` when an existing record was overwritten.
    pub fn upsert_month(&mut self, month: MonthData) -> bool {
        match self
            .months
            .iter_mut()
            .find(|m| m.is_key(&month.user, &month.month))
        {
            Some(existing) => {
                *existing = month;
                true
            }
            None => {
                self.months.push(month);
                false
            }
        }
    }

    /// Remove the record stored under `(user, month)`.
    ///
    /// Returns `false` (and leaves the document untouched) if there was none.
    pub fn remove_month(&mut self, user: &str, month: &str) -> bool {
        let before = self.months.len();
        self.months.retain(|m| !m.is_key(user, month));
        self.months.len() != before
    }

    /// All months recorded for one user, in stored order.
    pub fn months_for<'a>(&'a self, user: &'a str) -> impl Iterator<Item = &'a MonthData> + 'a {
        self.months.iter().filter(move |m| m.user == user)
    }
}

/// Charges every new document starts with in its legacy catalog.
pub fn seed_fixed_expenses() -> Vec<FixedExpense> {
    vec![
        FixedExpense::new("1", 500.0, "Loyer"),
        FixedExpense::new("2", 50.0, "Internet"),
        FixedExpense::new("3", 80.0, "Électricité"),
    ]
}
