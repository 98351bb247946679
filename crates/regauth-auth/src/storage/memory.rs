//! In-memory credential store.
//!
//! Accounts are seeded once from `username:secret` entries and are read-only
//! afterwards. Secrets are kept only as Argon2id hashes.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::AuthResult;
use crate::error::AuthError;
use crate::password::{hash_secret, init_dummy_hash, is_phc_hash, verify_dummy, verify_secret};
use crate::policy::{AccessDecisionPoint, PassThroughPolicy};
use crate::storage::CredentialStore;
use crate::types::{Account, AuthRequest, ResourceScope};

const ENTRY_SEPARATOR: char = ':';

/// Credential store backed by a hash map of username to secret hash.
pub struct InMemoryCredentialStore {
    accounts: RwLock<HashMap<String, String>>,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a store seeded from `username:secret` entries.
    ///
    /// The entry is split at the first `:`, so secrets may contain colons.
    /// A secret that already is an Argon2 PHC string is stored unchanged;
    /// anything else is hashed. Later entries for the same username win.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error for an entry without `:`, with an
    /// empty username, or if hashing fails.
    pub fn from_entries<I, S>(entries: I) -> AuthResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        init_dummy_hash()
            .map_err(|e| AuthError::configuration(format!("failed to prepare dummy hash: {e}")))?;

        let store = Self::new();
        {
            let mut accounts = store
                .accounts
                .write()
                .map_err(|_| AuthError::configuration("credential store lock poisoned"))?;

            for entry in entries {
                let (username, secret) = parse_entry(entry.as_ref())?;
                let hash = if is_phc_hash(secret) {
                    secret.to_string()
                } else {
                    hash_secret(secret).map_err(|e| {
                        AuthError::configuration(format!(
                            "failed to hash secret for '{username}': {e}"
                        ))
                    })?
                };
                accounts.insert(username.to_string(), hash);
            }

            tracing::info!(accounts = accounts.len(), "In-memory credential store seeded");
        }

        Ok(store)
    }

    /// Returns the number of accounts.
    pub fn len(&self) -> usize {
        self.accounts.read().map(|a| a.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds no accounts.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stored_hash(&self, username: &str) -> AuthResult<Option<String>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| AuthError::storage("credential store lock poisoned"))?;
        Ok(accounts.get(username).cloned())
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_entry(entry: &str) -> AuthResult<(&str, &str)> {
    let (username, secret) = entry.split_once(ENTRY_SEPARATOR).ok_or_else(|| {
        AuthError::configuration("account entries must have the form 'username:secret'")
    })?;

    if username.is_empty() {
        return Err(AuthError::configuration("account entry has an empty username"));
    }

    Ok((username, secret))
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn verify_credentials(
        &self,
        username: &str,
        secret: &str,
    ) -> AuthResult<Option<Account>> {
        let stored = self.stored_hash(username)?;

        // Argon2 is CPU-bound; keep it off the async workers.
        let candidate = Zeroizing::new(secret.to_string());
        let matched = tokio::task::spawn_blocking(move || match stored {
            Some(hash) => verify_secret(&candidate, &hash).unwrap_or(false),
            None => {
                verify_dummy(&candidate);
                false
            }
        })
        .await
        .map_err(|e| AuthError::storage(format!("credential check aborted: {e}")))?;

        Ok(matched.then(|| Account::verified(username)))
    }
}

/// The in-memory backend grants what is asked, like the reference policy.
#[async_trait]
impl AccessDecisionPoint for InMemoryCredentialStore {
    async fn decide(&self, request: &AuthRequest) -> AuthResult<Option<ResourceScope>> {
        PassThroughPolicy.decide(request).await
    }
}
