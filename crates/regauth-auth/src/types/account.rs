//! Account records.

use std::fmt;

use serde::Serialize;
use zeroize::Zeroize;

/// A registry account.
///
/// The secret is only populated while credentials are being verified. Every
/// `Account` handed out by a [`CredentialStore`](crate::storage::CredentialStore)
/// has it cleared, and it is never serialized or printed.
#[derive(Clone, Serialize)]
pub struct Account {
    /// Account name, used as the token subject.
    pub username: String,

    #[serde(skip)]
    secret: String,
}

impl Account {
    /// Creates an account carrying a secret.
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    /// Creates an account without a secret.
    pub fn verified(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: String::new(),
        }
    }

    /// Returns the secret, empty once cleared.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Returns `true` if the account still carries secret material.
    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Wipes the secret from memory.
    pub fn clear_secret(&mut self) {
        self.secret.zeroize();
    }
}

impl Drop for Account {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("secret", &if self.has_secret() { "[redacted]" } else { "" })
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_secret() {
        let mut account = Account::new("alice", "secret1");
        assert!(account.has_secret());

        account.clear_secret();
        assert!(!account.has_secret());
        assert_eq!(account.secret(), "");
        assert_eq!(account.username, "alice");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let account = Account::new("alice", "secret1");
        let debug = format!("{:?}", account);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret1"));
    }

    #[test]
    fn test_secret_is_not_serialized() {
        let account = Account::new("alice", "secret1");
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json.get("secret").is_none());
    }
}
