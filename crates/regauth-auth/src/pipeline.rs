//! The token-issuance pipeline.
//!
//! One request moves through the stages below in a single pass:
//!
//! ```text
//! Received -> Authenticate -> ParseScope -> DecideAccess -> IssueToken -> Respond
//!                  |                             |               |
//!                  +------------ 401 ------------+              500
//! ```
//!
//! Nothing is produced until the last stage, so a request whose future is
//! dropped part-way leaves no trace.

use std::fmt;
use std::sync::Arc;

use time::OffsetDateTime;

use crate::AuthResult;
use crate::error::AuthError;
use crate::extractors::BasicCredentials;
use crate::policy::AccessDecisionPoint;
use crate::storage::CredentialStore;
use crate::token::TokenIssuer;
use crate::types::{Account, AuthRequest, ResourceScope, ScopeParser};

/// Pipeline stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The request arrived.
    Received,
    /// Credentials are being verified.
    Authenticate,
    /// The scope parameter is being parsed.
    ParseScope,
    /// The access decision point is consulted.
    DecideAccess,
    /// The token is built and signed.
    IssueToken,
    /// The response is ready.
    Respond,
}

impl Stage {
    /// Returns the stage name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Authenticate => "authenticate",
            Self::ParseScope => "parse_scope",
            Self::DecideAccess => "decide_access",
            Self::IssueToken => "issue_token",
            Self::Respond => "respond",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticates, authorizes and issues a token for one request at a time.
///
/// Cheap to share: wrap it in an `Arc` and hand it to every handler.
pub struct AuthorizationPipeline {
    store: Arc<dyn CredentialStore>,
    policy: Arc<dyn AccessDecisionPoint>,
    scope_parser: ScopeParser,
    issuer: TokenIssuer,
}

impl AuthorizationPipeline {
    /// Creates a pipeline from its collaborators.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        policy: Arc<dyn AccessDecisionPoint>,
        scope_parser: ScopeParser,
        issuer: TokenIssuer,
    ) -> Self {
        Self {
            store,
            policy,
            scope_parser,
            issuer,
        }
    }

    /// Returns the token issuer.
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Runs a token request to completion and returns the signed token.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailed` when credentials are missing or wrong
    /// - `AccessDenied` when the policy grants nothing
    /// - `Storage` (or any other decision error) when a backend fails
    /// - `Signing` when the token cannot be signed
    pub async fn run(
        &self,
        credentials: Option<BasicCredentials>,
        service: &str,
        scope: &str,
    ) -> AuthResult<String> {
        enter(Stage::Received);

        enter(Stage::Authenticate);
        let account = self.authenticate(credentials).await?;

        enter(Stage::ParseScope);
        let requested = self.scope_parser.parse(scope, service);

        enter(Stage::DecideAccess);
        let request = AuthRequest::new(account, requested);
        let granted = self.decide(&request).await?;

        enter(Stage::IssueToken);
        let AuthRequest { account, .. } = request;
        let account = account.ok_or(AuthError::AuthenticationFailed)?;
        let token = self
            .issuer
            .issue(&account, granted, OffsetDateTime::now_utc())
            .inspect_err(|e| tracing::error!(error = %e, "Failed to sign token"))?;

        enter(Stage::Respond);
        Ok(token)
    }

    async fn authenticate(&self, credentials: Option<BasicCredentials>) -> AuthResult<Account> {
        let Some(credentials) = credentials else {
            tracing::info!("Token request without credentials");
            return Err(AuthError::AuthenticationFailed);
        };

        match self
            .store
            .verify_credentials(&credentials.username, credentials.secret())
            .await
        {
            Ok(Some(account)) => {
                tracing::info!(username = %account.username, "Authentication succeeded");
                Ok(account)
            }
            Ok(None) => {
                tracing::info!(username = %credentials.username, "Authentication failed");
                Err(AuthError::AuthenticationFailed)
            }
            Err(e) => {
                tracing::error!(error = %e, username = %credentials.username, "Credential store failed");
                Err(e)
            }
        }
    }

    async fn decide(&self, request: &AuthRequest) -> AuthResult<ResourceScope> {
        match self.policy.decide(request).await {
            Ok(Some(granted)) => {
                tracing::debug!(granted = %granted, "Access granted");
                Ok(granted)
            }
            Ok(None) => {
                tracing::info!(
                    username = request.username().unwrap_or_default(),
                    scope = %request.requested_scope,
                    "Access denied"
                );
                Err(AuthError::access_denied(format!(
                    "no grant for {}",
                    request.requested_scope
                )))
            }
            Err(e) => {
                tracing::error!(error = %e, "Access decision failed");
                Err(AuthError::access_denied(e.to_string()))
            }
        }
    }
}

impl fmt::Debug for AuthorizationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationPipeline")
            .field("scope_parser", &self.scope_parser)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

fn enter(stage: Stage) {
    tracing::debug!(stage = %stage, "Token pipeline");
}
