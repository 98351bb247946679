//! Credential storage.
//!
//! This module defines the [`CredentialStore`] trait through which the
//! pipeline verifies username/secret pairs, and the in-memory reference
//! backend.
//!
//! Any backend (in-memory, relational, remote) implements the trait; the
//! concrete backend is chosen when the pipeline is constructed.

pub mod memory;

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Account;

pub use memory::InMemoryCredentialStore;

/// Verifies account credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Verify a username and secret.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(account))` if the pair is valid; the account's secret is cleared
    /// - `Ok(None)` if the user is unknown or the secret does not match
    ///
    /// Implementations must not let callers tell the two `None` cases apart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend itself fails.
    async fn verify_credentials(&self, username: &str, secret: &str)
    -> AuthResult<Option<Account>>;
}
