//! Login and auto-registration.
//!
//! The first login with an unseen username creates that user. Later logins
//! must present the same password. No session or token is issued; clients
//! keep the username themselves.
//!
//! Passwords are stored as Argon2 PHC strings. Documents written before
//! hashing existed hold plaintext values; those still verify and are
//! replaced with a hash on the next successful login.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tally_core::{AllData, User};

use crate::error::ApiError;

/// Result of a successful [`authenticate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthOutcome {
    /// A new user record was created.
    pub created: bool,
    /// A legacy plaintext password was replaced with a hash.
    pub upgraded: bool,
}

impl AuthOutcome {
    /// Whether the document was modified and needs saving.
    pub fn modified(&self) -> bool {
        self.created || self.upgraded
    }
}

/// Whether a stored password value is an Argon2 hash.
pub fn is_hashed(stored: &str) -> bool {
    stored.starts_with("$argon2")
}

/// Hash a password with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Check `candidate` against a stored hash or legacy plaintext value.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
    if !is_hashed(stored) {
        return stored == candidate;
    }
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is unreadable");
            false
        }
    }
}

/// Log `username` in, creating the user on first sight.
///
/// Mutates `data` when a user is created or a password upgraded; the caller
/// saves it when [`AuthOutcome::modified`] is set.
pub fn authenticate(
    data: &mut AllData,
    username: &str,
    password: &str,
    hash_passwords: bool,
) -> Result<AuthOutcome, ApiError> {
    if username.is_empty() {
        return Err(ApiError::missing("username"));
    }
    if password.is_empty() {
        return Err(ApiError::missing("password"));
    }

    let Some(user) = data.user_mut(username) else {
        let stored = if hash_passwords {
            hash_password(password)?
        } else {
            password.to_string()
        };
        data.users.push(User::new(username, stored));
        tracing::info!(user = %username, "Registered new user");
        return Ok(AuthOutcome {
            created: true,
            upgraded: false,
        });
    };

    if !verify_password(&user.password, password) {
        tracing::warn!(user = %username, "Login rejected");
        return Err(ApiError::AuthenticationFailed);
    }

    let upgraded = hash_passwords && !is_hashed(&user.password);
    if upgraded {
        user.password = hash_password(password)?;
        tracing::info!(user = %username, "Upgraded plaintext password to hash");
    }

    Ok(AuthOutcome {
        created: false,
        upgraded,
    })
}

/// Hash every plaintext password in the document. Returns how many changed.
pub fn hash_all_passwords(data: &mut AllData) -> Result<usize, ApiError> {
    let mut changed = 0;
    for user in data.users.iter_mut().filter(|u| !is_hashed(&u.password)) {
        user.password = hash_password(&user.password)?;
        changed += 1;
    }
    Ok(changed)
}
