//! `tally check` command implementation.
//!
//! Loads the document through the configured store and reports problems the
//! API would not catch on its own:
//! - duplicate usernames or `(user, month)` keys
//! - months owned by unknown users
//! - duplicate ids inside a fixed-expense list
//! - passwords still stored as plaintext
//!
//! The check never writes. A file backend whose document does not exist yet is
//! reported as such instead of being seeded on disk.

use anyhow::Result;
use std::collections::HashSet;
use tally_core::{AllData, FixedExpense, StoreBackend, StoreConfig, TallyConfig};
use tally_server::auth::is_hashed;

/// Severity level for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    pub message: String,
}

impl CheckFinding {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }
}

/// Inspect a loaded document.
pub fn check_document(data: &AllData) -> Vec<CheckFinding> {
    let mut findings = Vec::new();

    let mut usernames = HashSet::new();
    for user in &data.users {
        if !usernames.insert(user.username.as_str()) {
            findings.push(CheckFinding::error(format!("duplicate user '{}'", user.username)));
        }
        if !is_hashed(&user.password) {
            findings.push(CheckFinding::info(format!(
                "user '{}' has a plaintext password (run `tally hash-passwords`)",
                user.username
            )));
        }
        findings.extend(
            duplicate_ids(user.defaults())
                .map(|id| CheckFinding::warning(format!("user '{}' catalog repeats id '{id}'", user.username))),
        );
    }

    let mut keys = HashSet::new();
    for month in &data.months {
        if !keys.insert((month.user.as_str(), month.month.as_str())) {
            findings.push(CheckFinding::error(format!(
                "duplicate month '{}' for user '{}'",
                month.month, month.user
            )));
        }
        if !usernames.contains(month.user.as_str()) {
            findings.push(CheckFinding::warning(format!(
                "month '{}' belongs to unknown user '{}'",
                month.month, month.user
            )));
        }
        findings.extend(duplicate_ids(&month.fixed_expenses).map(|id| {
            CheckFinding::warning(format!(
                "month '{}' of '{}' repeats fixed expense id '{id}'",
                month.month, month.user
            ))
        }));
    }

    findings.extend(
        duplicate_ids(&data.default_fixed_expenses)
            .map(|id| CheckFinding::warning(format!("legacy catalog repeats id '{id}'"))),
    );

    findings
}

fn duplicate_ids(list: &[FixedExpense]) -> impl Iterator<Item = String> + '_ {
    let mut seen = HashSet::new();
    list.iter()
        .filter(move |fx| !seen.insert(fx.id.as_str()))
        .map(|fx| fx.id.clone())
}

/// Whether the file backend's document has not been created yet.
async fn document_missing(store: &StoreConfig) -> Result<bool> {
    if store.backend != StoreBackend::File {
        return Ok(false);
    }
    Ok(!tokio::fs::try_exists(&store.path).await?)
}

/// Run `tally check`. Returns `true` when no errors were found.
pub async fn run(config: &TallyConfig) -> Result<bool> {
    if document_missing(&config.store).await? {
        println!("Document: file:{} (not created yet)", config.store.path.display());
        println!("All checks passed.");
        return Ok(true);
    }

    let store = tally_store::create_store(&config.store)?;
    let data = store.load().await?;

    println!("Document: {}", store.describe());
    println!(
        "  {} users, {} months, revision {}",
        data.users.len(),
        data.months.len(),
        data.revision
    );

    let mut findings = check_document(&data);
    findings.sort_by(|a, b| b.severity.cmp(&a.severity));
    for finding in &findings {
        println!("  [{}] {}", finding.severity, finding.message);
    }

    let errors = findings.iter().filter(|f| f.severity == Severity::Error).count();
    if errors == 0 {
        println!("All checks passed.");
    } else {
        println!("{errors} error(s) found.");
    }
    Ok(errors == 0)
}
