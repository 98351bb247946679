//! Token issuance.
//!
//! The issuer is shared across requests and holds no mutable state; signing
//! is synchronous and CPU-bound.

use jsonwebtoken::TokenData;
use time::{Duration, OffsetDateTime};

use super::claims::TokenClaims;
use super::jwt::{JwtError, SigningKeyPair};
use crate::AuthResult;
use crate::error::AuthError;
use crate::types::{Account, ResourceScope};

/// Builds and signs registry tokens.
#[derive(Debug)]
pub struct TokenIssuer {
    key: SigningKeyPair,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenIssuer {
    /// Creates an issuer that signs with `key`.
    ///
    /// `issuer` becomes the `iss` claim, `audience` (the registry domain)
    /// the `aud` claim, and `ttl` the lifetime of every token.
    #[must_use]
    pub fn new(
        key: SigningKeyPair,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            key,
            issuer: issuer.into(),
            audience: audience.into(),
            ttl,
        }
    }

    /// Issues a compact token granting `granted` to `account`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if the key cannot sign.
    pub fn issue(
        &self,
        account: &Account,
        granted: ResourceScope,
        now: OffsetDateTime,
    ) -> AuthResult<String> {
        let claims = TokenClaims::new(
            &self.issuer,
            &account.username,
            &self.audience,
            granted,
            now,
            self.ttl,
        );

        let token = self
            .key
            .encode(&claims)
            .map_err(|e| AuthError::signing(e.to_string()))?;

        tracing::debug!(
            sub = %claims.sub,
            jti = %claims.jti,
            exp = claims.exp,
            kid = %self.key.kid,
            "Token issued"
        );
        Ok(token)
    }

    /// Verifies a token issued by this issuer and returns its header and claims.
    ///
    /// # Errors
    ///
    /// Returns a `JwtError` if the signature, issuer, audience or validity
    /// window does not check out.
    pub fn verify(&self, token: &str) -> Result<TokenData<TokenClaims>, JwtError> {
        self.key.decode(token, &self.issuer, &self.audience)
    }

    /// Returns the key ID placed in every token header.
    pub fn kid(&self) -> &str {
        &self.key.kid
    }
}

#[cfg(test)]
mod tests {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

    use super::*;
    use crate::token::jwt::tests::{ec256_key_pair, rsa_key_pair};
    use crate::token::jwt::{KeyIdFormat, SigningAlgorithm};

    const ISSUER: &str = "auth.example.com";
    const REGISTRY: &str = "registry.example.com";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(
            ec256_key_pair(KeyIdFormat::Libtrust),
            ISSUER,
            REGISTRY,
            Duration::seconds(300),
        )
    }

    fn decode_segment(segment: &str) -> serde_json::Value {
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segment).unwrap()).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = issuer();
        let scope = ResourceScope::new("repository", "app1", ["pull"]);
        let now = OffsetDateTime::now_utc();

        let token = issuer
            .issue(&Account::verified("alice"), scope.clone(), now)
            .unwrap();
        let data = issuer.verify(&token).unwrap();

        assert_eq!(data.header.kid.as_deref(), Some(issuer.kid()));
        assert_eq!(data.claims.iss, ISSUER);
        assert_eq!(data.claims.sub, "alice");
        assert_eq!(data.claims.aud, REGISTRY);
        assert_eq!(data.claims.access, vec![scope]);
        assert_eq!(data.claims.iat, now.unix_timestamp());
        assert_eq!(data.claims.nbf, data.claims.iat - 1);
        assert_eq!(data.claims.exp, data.claims.iat + 300);
    }

    #[test]
    fn test_compact_layout() {
        let issuer = issuer();
        let token = issuer
            .issue(
                &Account::verified("alice"),
                ResourceScope::catalog(),
                OffsetDateTime::now_utc(),
            )
            .unwrap();

        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);
        assert!(segments.iter().all(|s| !s.is_empty() && !s.contains('=')));

        let header = decode_segment(segments[0]);
        assert_eq!(header["typ"], "JWT");
        assert_eq!(header["alg"], "ES256");
        assert_eq!(header["kid"], issuer.kid());

        let claims = decode_segment(segments[1]);
        assert_eq!(claims["access"][0]["type"], "catalog");
        assert_eq!(claims["access"][0]["name"], "");
        assert_eq!(claims["access"][0]["actions"][0], "*");
    }

    #[test]
    fn test_same_second_tokens_differ_and_verify() {
        let issuer = issuer();
        let now = OffsetDateTime::now_utc();
        let account = Account::verified("alice");
        let scope = ResourceScope::new("repository", "app1", ["pull"]);

        let first = issuer.issue(&account, scope.clone(), now).unwrap();
        let second = issuer.issue(&account, scope, now).unwrap();
        assert_ne!(first, second);

        let first = issuer.verify(&first).unwrap().claims;
        let second = issuer.verify(&second).unwrap().claims;
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_rsa_issuer() {
        let issuer = TokenIssuer::new(
            rsa_key_pair(SigningAlgorithm::RS512),
            ISSUER,
            REGISTRY,
            Duration::seconds(60),
        );
        let token = issuer
            .issue(
                &Account::verified("bob"),
                ResourceScope::new("repository", "app2", ["push", "pull"]),
                OffsetDateTime::now_utc(),
            )
            .unwrap();

        let data = issuer.verify(&token).unwrap();
        assert_eq!(data.header.alg, jsonwebtoken::Algorithm::RS512);
        assert_eq!(data.claims.access[0].actions, vec!["push", "pull"]);
    }

    #[test]
    fn test_tampered_token_fails() {
        let issuer = issuer();
        let token = issuer
            .issue(
                &Account::verified("alice"),
                ResourceScope::new("repository", "app1", ["pull"]),
                OffsetDateTime::now_utc(),
            )
            .unwrap();

        let mut segments: Vec<String> = token.split('.').map(str::to_string).collect();
        let mut claims = decode_segment(&segments[1]);
        claims["access"][0]["actions"] = serde_json::json!(["pull", "push"]);
        segments[1] = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());

        assert!(issuer.verify(&segments.join(".")).is_err());
    }

    #[test]
    fn test_expired_token_fails_verification() {
        let issuer = issuer();
        let long_ago = OffsetDateTime::now_utc() - Duration::hours(2);
        let token = issuer
            .issue(&Account::verified("alice"), ResourceScope::catalog(), long_ago)
            .unwrap();

        assert!(matches!(issuer.verify(&token), Err(JwtError::Expired)));
    }
}
