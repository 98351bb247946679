//! HTTP Basic credentials.
//!
//! Registry clients send `Authorization: Basic base64(username:secret)` on
//! every token request. A missing or unreadable header is not an error at
//! this layer; the pipeline turns absent credentials into an
//! authentication failure.

use std::fmt;

use axum::http::{HeaderMap, header::AUTHORIZATION};
use base64::{Engine, engine::general_purpose::STANDARD};
use zeroize::Zeroizing;

const BASIC_PREFIX: &str = "Basic ";

/// A username and secret taken from a Basic authorization header.
#[derive(Clone)]
pub struct BasicCredentials {
    /// Username before the first `:`.
    pub username: String,

    secret: Zeroizing<String>,
}

impl BasicCredentials {
    /// Creates credentials from their parts.
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: Zeroizing::new(secret.into()),
        }
    }

    /// Returns the secret.
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Reads Basic credentials from request headers.
pub fn extract_basic_auth(headers: &HeaderMap) -> Option<BasicCredentials> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    parse_basic_auth(value)
}

/// Parses an `Authorization` header value of the form `Basic base64(user:secret)`.
///
/// The scheme is matched case-insensitively. The decoded value is split at
/// the first `:`, so secrets may contain colons.
pub fn parse_basic_auth(header: &str) -> Option<BasicCredentials> {
    let (scheme, encoded) = header.split_at_checked(BASIC_PREFIX.len())?;
    if !scheme.eq_ignore_ascii_case(BASIC_PREFIX) {
        return None;
    }
    let decoded = Zeroizing::new(STANDARD.decode(encoded.trim()).ok()?);
    let credentials = std::str::from_utf8(&decoded).ok()?;
    let (username, secret) = credentials.split_once(':')?;

    Some(BasicCredentials::new(username, secret))
}
