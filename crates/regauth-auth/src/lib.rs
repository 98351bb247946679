//! # regauth-auth
//!
//! Token issuance core for a container registry auth server.
//!
//! This crate provides:
//! - Credential verification against a pluggable store
//! - Parsing of registry scopes (`type:name:actions`)
//! - Access decisions through a pluggable policy
//! - Signing of registry bearer tokens
//!
//! ## Overview
//!
//! A client that wants to talk to the registry first asks this service for
//! a token. The [`pipeline::AuthorizationPipeline`] verifies the client's
//! Basic credentials, parses the requested scope, asks the access decision
//! point what to grant and returns a signed token the registry can verify
//! with the issuer's public key.
//!
//! ## Modules
//!
//! - [`config`] - Token service configuration
//! - [`error`] - Error taxonomy
//! - [`extractors`] - Basic credential extraction
//! - [`http`] - Axum handler for the token endpoint
//! - [`password`] - Argon2id secret hashing
//! - [`pipeline`] - The request pipeline
//! - [`policy`] - Access decision points
//! - [`storage`] - Credential stores
//! - [`token`] - Signing keys, claims and the token issuer
//! - [`types`] - Accounts, scopes and requests

pub mod config;
pub mod error;
pub mod extractors;
pub mod http;
pub mod password;
pub mod pipeline;
pub mod policy;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{AuthConfig, ConfigError};
pub use error::{AuthError, ErrorCategory};
pub use http::{TokenQuery, TokenResponse, TokenState, token_handler};
pub use pipeline::{AuthorizationPipeline, Stage};
pub use policy::{AccessDecisionPoint, AclPolicy, AclRule, PassThroughPolicy};
pub use storage::{CredentialStore, InMemoryCredentialStore};
pub use token::{JwtError, KeyIdFormat, SigningAlgorithm, SigningKeyPair, TokenClaims, TokenIssuer};
pub use types::{Account, AuthRequest, ResourceScope, ScopeParser};

/// Type alias for authentication/authorization results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use regauth_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthConfig, ConfigError};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::http::{TokenState, token_handler};
    pub use crate::pipeline::AuthorizationPipeline;
    pub use crate::policy::{AccessDecisionPoint, AclPolicy, AclRule, PassThroughPolicy};
    pub use crate::storage::{CredentialStore, InMemoryCredentialStore};
    pub use crate::token::{KeyIdFormat, SigningAlgorithm, SigningKeyPair, TokenIssuer};
    pub use crate::types::{Account, AuthRequest, ResourceScope, ScopeParser};
}
