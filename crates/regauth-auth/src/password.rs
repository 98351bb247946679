//! Account secret hashing and verification.
//!
//! Secrets are stored as Argon2id PHC strings with a per-secret random salt.
//! Verification goes through Argon2, which compares digests in constant time.
//!
//! # Example
//!
//! ```
//! use regauth_auth::password::{hash_secret, verify_secret};
//!
//! let hash = hash_secret("secret1").unwrap();
//! assert!(verify_secret("secret1", &hash).unwrap());
//! assert!(!verify_secret("wrongpass", &hash).unwrap());
//! ```

use std::sync::OnceLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// PHC identifier prefix shared by all Argon2 variants.
const ARGON2_PHC_PREFIX: &str = "$argon2";

/// Hash a secret for storage using Argon2id.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails (rare).
pub fn hash_secret(secret: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(secret.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a secret against a stored Argon2 hash.
///
/// Returns `Ok(false)` on mismatch and `Err` only if the hash itself cannot
/// be parsed.
pub fn verify_secret(secret: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    let result = Argon2::default().verify_password(secret.as_bytes(), &parsed_hash);
    Ok(result.is_ok())
}

/// Returns `true` if `value` already is an Argon2 PHC string.
pub fn is_phc_hash(value: &str) -> bool {
    value.starts_with(ARGON2_PHC_PREFIX)
}

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

const DUMMY_SECRET: &str = "regauth-dummy-secret";

/// Computes the hash [`verify_dummy`] checks against, if not done yet.
///
/// Credential stores call this while seeding so the first unknown-user
/// lookup does not pay for hashing.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails.
pub fn init_dummy_hash() -> Result<(), argon2::password_hash::Error> {
    if DUMMY_HASH.get().is_none() {
        let hash = hash_secret(DUMMY_SECRET)?;
        let _ = DUMMY_HASH.set(hash);
    }
    Ok(())
}

/// Burns one verification against a fixed hash.
///
/// Used for unknown usernames so that they cost as much as a wrong secret.
pub fn verify_dummy(secret: &str) {
    if DUMMY_HASH.get().is_none() {
        let _ = init_dummy_hash();
    }
    if let Some(hash) = DUMMY_HASH.get() {
        let _ = verify_secret(secret, hash);
    }
}

#[cfg(test)]
pub(crate) fn dummy_hash_ready() -> bool {
    DUMMY_HASH.get().is_some()
}
