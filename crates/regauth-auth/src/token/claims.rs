//! Registry token claims.

use rand::Rng;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::types::ResourceScope;

/// Claims of a registry bearer token.
///
/// Field order is the serialized member order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer domain.
    pub iss: String,

    /// Username the token was issued to.
    pub sub: String,

    /// Registry domain the token is meant for.
    pub aud: String,

    /// Expiry, seconds since the epoch.
    pub exp: i64,

    /// Not-before, one second before issuance to absorb clock skew.
    pub nbf: i64,

    /// Issued-at, seconds since the epoch.
    pub iat: i64,

    /// Random token ID, a non-negative 63-bit integer in decimal.
    pub jti: String,

    /// The granted scope; always exactly one entry.
    pub access: Vec<ResourceScope>,
}

impl TokenClaims {
    /// Builds the claims for `subject` at `now`.
    pub fn new(
        issuer: impl Into<String>,
        subject: impl Into<String>,
        audience: impl Into<String>,
        granted: ResourceScope,
        now: OffsetDateTime,
        ttl: Duration,
    ) -> Self {
        let iat = now.unix_timestamp();
        Self {
            iss: issuer.into(),
            sub: subject.into(),
            aud: audience.into(),
            exp: iat.saturating_add(ttl.whole_seconds()),
            nbf: iat.saturating_sub(1),
            iat,
            jti: generate_jti(),
            access: vec![granted],
        }
    }

    /// Returns the single granted scope.
    pub fn granted(&self) -> Option<&ResourceScope> {
        self.access.first()
    }
}

fn generate_jti() -> String {
    rand::thread_rng().gen_range(0..i64::MAX).to_string()
}
