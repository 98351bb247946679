//! Token service configuration.
//!
//! These types describe the `[auth]` section of the server configuration:
//! the domains tokens are issued for, their lifetime, the signing key, the
//! credential store and the access policy.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! registry_domain = "http://localhost:5000"
//! issuer_domain = "http://localhost:4444"
//! token_duration_secs = 300
//!
//! [auth.signing]
//! algorithm = "RS256"
//! private_key_path = "certs/server.key"
//!
//! [auth.store]
//! backend = "memory"
//! accounts = ["alice:secret1"]
//! ```

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::AuthResult;
use crate::policy::{AccessDecisionPoint, AclPolicy, AclRule, PassThroughPolicy};
use crate::storage::{CredentialStore, InMemoryCredentialStore};
use crate::token::{KeyIdFormat, SigningAlgorithm};

/// Longest accepted token lifetime, one year.
pub const MAX_TOKEN_DURATION_SECS: i64 = 365 * 24 * 60 * 60;

/// Root token service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Registry domain; the only accepted `service` and the token audience.
    pub registry_domain: String,

    /// Issuer domain placed in the `iss` claim.
    pub issuer_domain: String,

    /// Token lifetime in seconds.
    pub token_duration_secs: i64,

    /// Signing key settings.
    pub signing: SigningConfig,

    /// Credential store settings.
    pub store: StoreConfig,

    /// Access policy settings.
    pub policy: PolicyConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            registry_domain: "http://localhost:5000".to_string(),
            issuer_domain: "http://localhost:4444".to_string(),
            token_duration_secs: 300,
            signing: SigningConfig::default(),
            store: StoreConfig::default(),
            policy: PolicyConfig::default(),
        }
    }
}

/// Signing key configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Signing algorithm (RS256, RS384, RS512, ES256, ES384).
    pub algorithm: String,

    /// Path to the PEM private key.
    pub private_key_path: String,

    /// Optional path to the PEM public key; must match the private key.
    pub public_key_path: Option<String>,

    /// How the `kid` header is derived.
    pub key_id_format: KeyIdFormat,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            algorithm: "RS256".to_string(),
            private_key_path: String::new(),
            public_key_path: None,
            key_id_format: KeyIdFormat::default(),
        }
    }
}

impl SigningConfig {
    /// Returns the parsed signing algorithm.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an unknown algorithm name.
    pub fn algorithm(&self) -> Result<SigningAlgorithm, ConfigError> {
        self.algorithm.parse().map_err(|_| {
            ConfigError::InvalidValue(format!(
                "unsupported signing algorithm '{}'",
                self.algorithm
            ))
        })
    }
}

/// Credential store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Accounts seeded from configuration and kept in memory.
    #[default]
    Memory,
}

/// Credential store configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend kind.
    pub backend: StoreBackend,

    /// Initial accounts as `username:secret` entries.
    ///
    /// Accepts a list or a single space-separated string, so the value can
    /// come from an environment variable.
    #[serde(deserialize_with = "deserialize_accounts")]
    pub accounts: Vec<String>,
}

impl StoreConfig {
    /// Builds the configured credential store.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if an account entry is malformed.
    pub fn build(&self) -> AuthResult<Arc<dyn CredentialStore>> {
        match self.backend {
            StoreBackend::Memory => Ok(Arc::new(InMemoryCredentialStore::from_entries(
                &self.accounts,
            )?)),
        }
    }
}

/// Access policy kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Every authenticated account gets the scope it asked for.
    #[default]
    PassThrough,
    /// Rule-based grants.
    Acl,
}

/// Access policy configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Policy kind.
    pub kind: PolicyKind,

    /// ACL rules; only used by the `acl` kind.
    pub rules: Vec<AclRule>,
}

impl PolicyConfig {
    /// Builds the configured access decision point.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if an ACL rule cannot be compiled.
    pub fn build(&self) -> AuthResult<Arc<dyn AccessDecisionPoint>> {
        match self.kind {
            PolicyKind::PassThrough => {
                tracing::warn!("Pass-through access policy: every account gets what it asks for");
                Ok(Arc::new(PassThroughPolicy))
            }
            PolicyKind::Acl => Ok(Arc::new(AclPolicy::new(self.rules.clone())?)),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - either domain is empty
    /// - the token duration is not positive
    /// - the signing algorithm is not supported
    ///
    /// Returns `ConfigError::Missing` if no private key path is set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry_domain.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "registry_domain cannot be empty".to_string(),
            ));
        }

        if self.issuer_domain.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "issuer_domain cannot be empty".to_string(),
            ));
        }

        if self.token_duration_secs <= 0 || self.token_duration_secs > MAX_TOKEN_DURATION_SECS {
            return Err(ConfigError::InvalidValue(format!(
                "token_duration_secs must be between 1 and {MAX_TOKEN_DURATION_SECS}, got {}",
                self.token_duration_secs
            )));
        }

        self.signing.algorithm()?;

        if self.signing.private_key_path.trim().is_empty() {
            return Err(ConfigError::Missing(
                "auth.signing.private_key_path".to_string(),
            ));
        }

        if self.policy.kind == PolicyKind::PassThrough && !self.policy.rules.is_empty() {
            tracing::warn!("ACL rules are ignored by the pass-through policy");
        }

        Ok(())
    }

    /// Returns the token lifetime.
    pub fn token_ttl(&self) -> time::Duration {
        time::Duration::seconds(self.token_duration_secs)
    }
}

fn deserialize_accounts<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Accounts {
        List(Vec<String>),
        Joined(String),
    }

    let accounts = match Accounts::deserialize(deserializer)? {
        Accounts::List(list) => list,
        Accounts::Joined(joined) => joined.split_whitespace().map(str::to_string).collect(),
    };
    Ok(accounts)
}
