//! Expense categories offered to clients.
//!
//! Expenses are not validated against this list. Clients use it for pickers
//! and to label category ids.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
}

/// Category ids with their display names, in picker order.
pub const CATEGORIES: &[Category] = &[
    Category { id: "alimentation", name: "Alimentation" },
    Category { id: "transport", name: "Transport" },
    Category { id: "loisirs", name: "Loisirs" },
    Category { id: "restaurant", name: "Restaurant" },
    Category { id: "shopping", name: "Shopping" },
    Category { id: "sante", name: "Santé" },
    Category { id: "autres", name: "Autres" },
];
