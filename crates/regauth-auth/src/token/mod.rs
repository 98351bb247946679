//! Registry token generation and verification.
//!
//! This module provides:
//!
//! - Signing keys and key IDs ([`jwt`])
//! - The claims carried by registry tokens ([`claims`])
//! - The [`TokenIssuer`] that builds and signs them ([`issuer`])

pub mod claims;
pub mod issuer;
pub mod jwt;

pub use claims::TokenClaims;
pub use issuer::TokenIssuer;
pub use jwt::{JwtError, KeyIdFormat, SigningAlgorithm, SigningKeyPair, libtrust_key_id};
