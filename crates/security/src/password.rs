//! bcrypt password hashing over `password || salt`

use opsgate_core::{Error, Result};
use tracing::warn;
use zeroize::Zeroizing;

pub use bcrypt::DEFAULT_COST;

/// Hash `password` with the site-wide salt appended, at the default cost
pub fn hash_password(salt: &str, password: &str) -> Result<String> {
    hash_password_with_cost(salt, password, DEFAULT_COST)
}

pub fn hash_password_with_cost(salt: &str, password: &str, cost: u32) -> Result<String> {
    let salted = salted(salt, password);
    bcrypt::hash(salted.as_bytes(), cost)
        .map_err(|e| Error::configuration(format!("password hashing failed: {e}")))
}

/// Check a candidate password against a stored bcrypt hash.
///
/// Hashes written before a site salt was configured carry no salt and are
/// accepted too. A stored value that is not a bcrypt hash never matches.
#[must_use]
pub fn verify_password(salt: &str, password: &str, stored_hash: &str) -> bool {
    let stored_hash = stored_hash.trim();
    match bcrypt::verify(salted(salt, password).as_bytes(), stored_hash) {
        Ok(true) => true,
        Ok(false) => !salt.is_empty() && bcrypt::verify(password, stored_hash).unwrap_or(false),
        Err(e) => {
            warn!(error = %e, "stored password hash is not a bcrypt hash");
            false
        }
    }
}

fn salted(salt: &str, password: &str) -> Zeroizing<String> {
    let mut salted = Zeroizing::new(String::with_capacity(password.len() + salt.len()));
    salted.push_str(password);
    salted.push_str(salt);
    salted
}
